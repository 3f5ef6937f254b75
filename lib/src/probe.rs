use std::net::IpAddr;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::ensure;
use anyhow::Context;
use anyhow::Result;
use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;
use tracing::instrument;
use tracing::warn;

/// Port probed when deciding if a private address is directly reachable.
pub const SSH_PORT: u16 = 22;

/// Checks whether a service is listening at an address.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Returns `true` only if the service answered. Never fails.
    async fn probe(&self, host: &str, port: u16) -> bool;
}

/// Timeouts used by [`SshProbe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(1000),
            read_timeout: Duration::from_millis(5000),
        }
    }
}

/// Probe that connects over TCP and expects the `SSH-` protocol banner.
#[derive(Debug, Clone)]
pub struct SshProbe {
    config: ProbeConfig,
    dns: Option<TokioResolver>,
}

impl SshProbe {
    /// Creates a probe using the system DNS config. If that config can't be
    /// read, the operating system resolver is used instead.
    #[must_use]
    pub fn new(config: ProbeConfig) -> Self {
        let dns = match TokioResolver::builder_tokio() {
            Ok(builder) => Some(builder.build()),
            Err(error) => {
                warn!(?error, "unable to read system DNS config, using OS resolver");
                None
            }
        };
        Self { config, dns }
    }

    async fn lookup(&self, host: &str, port: u16) -> Result<SocketAddr> {
        if let Ok(ip) = IpAddr::from_str(host) {
            return Ok(SocketAddr::new(ip, port));
        }

        let ip = match &self.dns {
            Some(dns) => dns
                .lookup_ip(host)
                .await
                .context("DNS lookup failed")?
                .iter()
                .next()
                .context("DNS lookup returned no addresses")?,
            None => tokio::net::lookup_host((host, port))
                .await
                .context("DNS lookup failed")?
                .next()
                .context("DNS lookup returned no addresses")?
                .ip(),
        };
        Ok(SocketAddr::new(ip, port))
    }

    async fn banner(&self, host: &str, port: u16) -> Result<[u8; 3]> {
        let addr = timeout(self.config.connect_timeout, self.lookup(host, port))
            .await
            .context("DNS lookup timed out")??;

        let mut stream = timeout(self.config.connect_timeout, TcpStream::connect(addr))
            .await
            .context("TCP connect timed out")?
            .context("TCP connect failed")?;

        // One read only; a banner split across packets is not accepted.
        let mut banner = [0u8; 3];
        let n = timeout(self.config.read_timeout, stream.read(&mut banner))
            .await
            .context("banner read timed out")?
            .context("banner read failed")?;
        ensure!(n == banner.len(), "short banner read: {n} bytes");

        Ok(banner)
    }
}

#[async_trait]
impl Probe for SshProbe {
    #[instrument(skip(self))]
    async fn probe(&self, host: &str, port: u16) -> bool {
        match self.banner(host, port).await {
            Ok(banner) => {
                let found = banner.eq_ignore_ascii_case(b"SSH");
                debug!(found, banner = ?String::from_utf8_lossy(&banner), "probed service");
                found
            }
            Err(error) => {
                debug!(?error, "probe failed, treating as unreachable");
                false
            }
        }
    }
}
