use anyhow::Result;
use clap::Args;
use hop::inventory::Inventory;
use hop::orchestrate::Orchestrator;
use hop::resolve::AddressResolver;
use hop::select::TableSelector;
use tracing::instrument;

use crate::args::ProbeArgs;
use crate::args::SshArgs;
use crate::cmd::launcher;
use crate::cmd::no_instances;
use crate::cmd::Run;

/// SSH to running instances
#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Only use instances whose id, name or location contain every term.
    filter: Vec<String>,

    /// Command to execute on host(s).
    #[arg(short = 'e', long = "execute", conflicts_with = "tmux")]
    command: Option<String>,

    /// Ignore exit code and continue running -e command on all hosts.
    #[arg(short = 'c', long = "continue", requires = "command")]
    keep_going: bool,

    /// Open a tmux session with a window for each host.
    #[arg(long)]
    tmux: bool,

    /// Print the commands instead of running them.
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    ssh_args: SshArgs,

    #[command(flatten)]
    probe_args: ProbeArgs,
}

impl Run for ConnectArgs {
    #[instrument(skip_all)]
    async fn run(&self, inventory: Inventory) -> Result<i32> {
        let instances = inventory.filter(&self.filter);
        if instances.is_empty() {
            return Ok(no_instances());
        }

        let orchestrator = Orchestrator::builder()
            .resolver(AddressResolver::new(self.probe_args.probe()))
            .launcher(launcher(self.dry_run))
            .jump_hosts(inventory.jump_hosts().clone())
            .options(self.ssh_args.ssh_options())
            .build();

        let code = if let Some(command) = &self.command {
            orchestrator
                .execute(&instances, command, self.keep_going)
                .await?
        } else if self.tmux {
            orchestrator.tmux(&instances).await?
        } else {
            let mut selector = TableSelector::stdio();
            orchestrator.interactive(&instances, &mut selector).await?
        };

        Ok(code)
    }
}
