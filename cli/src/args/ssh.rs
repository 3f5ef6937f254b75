use clap::Args;
use hop::command::SshOptions;

use crate::args::AuthArgs;

const HEADING: Option<&str> = Some("SSH Options");

/// Arguments shaping the `ssh` command line.
#[derive(Debug, Args, Clone)]
pub struct SshArgs {
    #[command(flatten)]
    pub auth: AuthArgs,

    /// Quiet mode.
    #[arg(short = 'q', long, help_heading = HEADING)]
    pub quiet: bool,

    /// Options passed to ssh -o, separated by commas.
    #[arg(short = 'o', long, value_name = "CSV", help_heading = HEADING)]
    pub options: Option<String>,

    /// Jump through a jump host.
    #[arg(short = 'j', long = "jumphost", help_heading = HEADING)]
    pub jump_host: bool,
}

impl SshArgs {
    pub fn ssh_options(&self) -> SshOptions {
        SshOptions::builder()
            .maybe_user(self.auth.user.clone())
            .maybe_key_file(self.auth.key_file.clone())
            .quiet(self.quiet)
            .maybe_extra_options(self.options.clone())
            .use_jump_host(self.jump_host)
            .build()
    }
}
