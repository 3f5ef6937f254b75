use camino::Utf8PathBuf;
use clap::Args;

const HEADING: Option<&str> = Some("Authentication Options");

/// Arguments for who to log in as.
#[derive(Debug, Args, Clone)]
pub struct AuthArgs {
    /// User to log in as.
    #[arg(short = 'u', long, help_heading = HEADING)]
    pub user: Option<String>,

    /// Private key to use (i.e. ssh -i ~/.ssh/id_rsa).
    #[arg(short = 'k', long = "keyfile", help_heading = HEADING)]
    pub key_file: Option<Utf8PathBuf>,
}
