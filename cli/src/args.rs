mod auth;
mod global;
mod probe;
mod ssh;

pub use auth::AuthArgs;
pub use global::GlobalArgs;
pub use probe::ProbeArgs;
pub use ssh::SshArgs;
