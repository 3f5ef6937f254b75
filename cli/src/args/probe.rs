use clap::Args;
use hop::probe::ProbeConfig;
use hop::probe::SshProbe;

const HEADING: Option<&str> = Some("Probe Options");

/// Arguments for checking whether private addresses are reachable.
#[derive(Debug, Args, Clone)]
pub struct ProbeArgs {
    /// Time allowed to open a TCP connection to a private address.
    #[arg(long, default_value = "1s", help_heading = HEADING)]
    pub connect_timeout: humantime::Duration,

    /// Time allowed for the SSH banner to arrive once connected.
    #[arg(long, default_value = "5s", help_heading = HEADING)]
    pub read_timeout: humantime::Duration,
}

impl ProbeArgs {
    pub fn probe(&self) -> SshProbe {
        SshProbe::new(ProbeConfig {
            connect_timeout: self.connect_timeout.into(),
            read_timeout: self.read_timeout.into(),
        })
    }
}
