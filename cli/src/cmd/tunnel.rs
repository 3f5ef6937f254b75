use std::time::Duration;

use anyhow::Result;
use clap::Args;
use hop::command::SshOptions;
use hop::command::TunnelPorts;
use hop::inventory::Inventory;
use hop::orchestrate::Orchestrator;
use hop::probe::ProbeConfig;
use hop::probe::SshProbe;
use hop::resolve::AddressResolver;
use hop::select::TableSelector;
use tracing::warn;

use crate::args::AuthArgs;
use crate::cmd::launcher;
use crate::cmd::no_instances;
use crate::cmd::Run;

/// Tunnel a local port to a running instance through its jump host
#[derive(Debug, Args)]
pub struct TunnelArgs {
    /// Only use instances whose id, name or location contain every term.
    filter: Vec<String>,

    /// Local port to listen on.
    #[arg(long, alias = "localPort", default_value_t = TunnelPorts::default().local)]
    local_port: u16,

    /// Remote port to connect to.
    #[arg(long, alias = "remotePort", default_value_t = TunnelPorts::default().remote)]
    remote_port: u16,

    /// Don't open a browser automatically.
    #[arg(long)]
    no_browser: bool,

    /// Print the command instead of running it.
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    auth_args: AuthArgs,
}

impl Run for TunnelArgs {
    async fn run(&self, inventory: Inventory) -> Result<i32> {
        let instances = inventory.filter(&self.filter);
        if instances.is_empty() {
            return Ok(no_instances());
        }

        let options = SshOptions::builder()
            .maybe_user(self.auth_args.user.clone())
            .maybe_key_file(self.auth_args.key_file.clone())
            .use_jump_host(true)
            .build();

        // Jump host mode never probes, so the default timeouts are fine.
        let orchestrator = Orchestrator::builder()
            .resolver(AddressResolver::new(SshProbe::new(ProbeConfig::default())))
            .launcher(launcher(self.dry_run))
            .jump_hosts(inventory.jump_hosts().clone())
            .options(options)
            .build();

        let ports = TunnelPorts {
            local: self.local_port,
            remote: self.remote_port,
        };

        if !self.no_browser && !self.dry_run {
            open_browser_later(format!("http://localhost:{}", ports.local));
        }

        let mut selector = TableSelector::stdio();
        let code = orchestrator
            .tunnel(&instances, &mut selector, ports)
            .await?;
        Ok(code)
    }
}

/// Opens `url` once the tunnel has had a moment to start listening.
fn open_browser_later(url: String) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        if let Err(error) = open::that_detached(&url) {
            warn!(?error, %url, "unable to open browser");
        }
    });
}
