use tracing::debug;

use crate::error::Error;
use crate::error::Result;
use crate::instance::Instance;
use crate::instance::JumpHostSet;

/// Picks the jump host nearest to `target`.
///
/// "Nearest" is the first jump host whose location tag equals the target's.
/// If none match, the first jump host is used. The result depends only on
/// the inputs.
///
/// # Errors
///
/// - [`Error::NoJumpHostAvailable`] if the set is empty
pub fn pick_jump_host<'a>(jump_hosts: &'a JumpHostSet, target: &Instance) -> Result<&'a Instance> {
    let candidates = jump_hosts.jump_hosts();
    let first = candidates.first().ok_or(Error::NoJumpHostAvailable)?;

    let picked = candidates
        .iter()
        .find(|jump_host| jump_host.location() == target.location())
        .unwrap_or(first);

    debug!(
        target = %target,
        jump_host = %picked,
        same_location = picked.location() == target.location(),
        "picked jump host"
    );
    Ok(picked)
}
