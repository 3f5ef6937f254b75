use tracing::debug;
use tracing::instrument;

use crate::command::SshOptions;
use crate::error::Error;
use crate::error::Result;
use crate::instance::Instance;
use crate::instance::JumpHostSet;
use crate::probe::Probe;
use crate::probe::SSH_PORT;
use crate::resolve::pick_jump_host;

/// Where to point `ssh` for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Hostname or IP address given to `ssh` as the destination.
    pub host: String,

    /// Jump host to relay through, if the target isn't directly reachable.
    pub jump_host: Option<Instance>,
}

/// Decides per instance whether to connect directly or through a jump host.
#[derive(Debug, Clone)]
pub struct AddressResolver<P> {
    probe: P,
}

impl<P: Probe> AddressResolver<P> {
    #[must_use]
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    /// Resolves `instance` to a destination.
    ///
    /// Unless jump host mode is forced, the private address is probed first.
    /// If it doesn't answer, the public address is trusted without probing.
    /// With neither, the private address is relayed through a jump host when
    /// one is configured. A hostname override replaces whichever address was
    /// chosen.
    ///
    /// # Errors
    ///
    /// - [`Error::UnreachableInstance`] if there is no usable address
    /// - [`Error::NoJumpHostAvailable`] if a jump host is needed but none exist
    #[instrument(skip_all, fields(instance = %instance))]
    pub async fn resolve(
        &self,
        instance: &Instance,
        jump_hosts: &JumpHostSet,
        options: &SshOptions,
    ) -> Result<ResolvedTarget> {
        if instance.is_unaddressable() {
            return Err(unreachable(instance));
        }

        let mut via_jump_host = options.use_jump_host;
        let mut candidate = None;

        if via_jump_host {
            candidate = instance
                .private_address()
                .or_else(|| instance.public_address());
        } else {
            if let Some(private) = instance.private_address() {
                if self.probe.probe(private, SSH_PORT).await {
                    candidate = Some(private);
                }
            }
            if candidate.is_none() {
                candidate = instance.public_address();
            }
            if candidate.is_none() && instance.hostname().is_none() {
                match instance.private_address() {
                    Some(private) if !jump_hosts.is_empty() => {
                        debug!("private address unreachable, relaying through jump host");
                        candidate = Some(private);
                        via_jump_host = true;
                    }
                    _ => return Err(unreachable(instance)),
                }
            }
        }

        let jump_host = if via_jump_host {
            Some(pick_jump_host(jump_hosts, instance)?.clone())
        } else {
            None
        };

        let host = instance
            .hostname()
            .or(candidate)
            .ok_or_else(|| unreachable(instance))?
            .to_owned();

        debug!(%host, via_jump_host, "resolved target");
        Ok(ResolvedTarget { host, jump_host })
    }
}

fn unreachable(instance: &Instance) -> Error {
    Error::UnreachableInstance {
        instance: instance.to_string(),
    }
}
