mod connect;
mod list;
mod tunnel;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use enum_dispatch::enum_dispatch;
use hop::inventory::Inventory;
use hop::orchestrate::DryRunLauncher;
use hop::orchestrate::LauncherImpl;
use hop::orchestrate::ProcessLauncher;
use tracing::debug;

use crate::args::GlobalArgs;

/// Hop onto cloud instances over ssh, directly or through a jump host
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    #[clap(flatten)]
    global_args: GlobalArgs,
}

/// Subcommands must implement [`Run`] to be executed at runtime. The returned
/// value becomes the process exit code.
#[enum_dispatch]
pub trait Run {
    async fn run(&self, inventory: Inventory) -> Result<i32>;
}

#[enum_dispatch(Run)]
#[derive(Debug, Subcommand)]
enum Command {
    #[command(alias = "ssh")]
    Connect(connect::ConnectArgs),
    List(list::ListArgs),
    Tunnel(tunnel::TunnelArgs),
}

pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = cli.global_args.init_tracing()?;

    let inventory = cli.global_args.load_inventory().await?;
    let code = cli.command.run(inventory).await?;
    debug!(code, "finished");

    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

fn launcher(dry_run: bool) -> LauncherImpl {
    if dry_run {
        DryRunLauncher.into()
    } else {
        ProcessLauncher.into()
    }
}

fn no_instances() -> i32 {
    println!("No instances found.");
    0
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ssh_is_an_alias_for_connect() {
        let cli = Cli::parse_from(["hop", "ssh", "-e", "uptime", "web"]);
        assert!(matches!(cli.command, Command::Connect(_)));
    }
}
