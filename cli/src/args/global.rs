use std::any::Any;
use std::fs::OpenOptions;
use std::io::IsTerminal;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Args;
use hop::inventory::Inventory;
use hop::util::dirs;
use tracing::debug;
use tracing_appender::non_blocking;
use tracing_glog::Glog;
use tracing_glog::GlogFields;
use tracing_glog::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

const HEADING: Option<&str> = Some("Global Options");

/// Global arguments that apply to every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// Inventory file declaring instances and jump hosts
    #[clap(long, env = "HOP_INVENTORY", default_value_t = default_inventory(), help_heading = HEADING, global = true)]
    pub inventory: Utf8PathBuf,

    /// Filter directive for stderr logs
    #[clap(long, env = "RUST_LOG", default_value = "error", help_heading = HEADING, global = true)]
    pub log_level: String,

    /// Filter directive for log file
    #[clap(long, default_value = "hop=debug,hop_cli=debug", help_heading = HEADING, global = true)]
    pub file_level: String,

    /// Data directory, holding the log of the last run
    #[clap(long, help_heading = HEADING, global = true)]
    pub data_dir: Option<Utf8PathBuf>,
}

/// Guard holder for [`tracing`] things that need to live until the end of the
/// program.
#[derive(Debug, Default)]
pub struct TracingGuard {
    guards: Vec<Box<dyn Any>>,
}

impl GlobalArgs {
    /// Initializes all [`tracing`] config.
    pub fn init_tracing(&self) -> Result<TracingGuard> {
        let mut guard = TracingGuard::default();

        let stderr_filter = EnvFilter::builder().parse_lossy(&self.log_level);
        let stderr_layer = tracing_subscriber::fmt::layer()
            .event_format(Glog::default().with_timer(LocalTime::default()))
            .fmt_fields(GlogFields::default())
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .with_filter(stderr_filter);

        let data_dir = match &self.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).context("unable to create data dir")?;
                dir.clone().into_std_path_buf()
            }
            None => dirs::data_dir("hop").context("unable to create data dir")?,
        };
        let log_file_path = data_dir.join("last.log");
        let log_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&log_file_path)
            .context("unable to create log file")?;
        let (file_writer, file_writer_guard) = non_blocking(log_file);
        let file_filter = EnvFilter::builder().parse_lossy(&self.file_level);
        let file_layer = tracing_subscriber::fmt::layer()
            .event_format(Glog::default().with_timer(LocalTime::default()))
            .fmt_fields(GlogFields::default())
            .with_ansi(false)
            .with_writer(file_writer)
            .with_filter(file_filter);
        guard.guards.push(Box::new(file_writer_guard));

        let subscriber = Registry::default().with(stderr_layer).with(file_layer);
        tracing::subscriber::set_global_default(subscriber)?;

        debug!(log_file = %log_file_path.display(), "Initialized tracing");

        Ok(guard)
    }

    /// Reads the inventory file.
    pub async fn load_inventory(&self) -> Result<Inventory> {
        Inventory::load(&self.inventory)
            .await
            .context("unable to load inventory")
    }
}

fn default_inventory() -> Utf8PathBuf {
    let path = dirs::config_dir("hop").join("inventory.toml");
    Utf8PathBuf::from_path_buf(path)
        .unwrap_or_else(|path| Utf8PathBuf::from(path.to_string_lossy().into_owned()))
}
