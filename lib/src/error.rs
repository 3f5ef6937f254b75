use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while turning instances into running `ssh` processes.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "unable to find a reachable address for instance {instance}; \
         use --jumphost or connect through a VPN"
    )]
    UnreachableInstance { instance: String },

    #[error("unable to find a jump host; declare one in the `jump-host` block of the inventory")]
    NoJumpHostAvailable,

    #[error("unable to determine the public IP address of jump host {jump_host}")]
    MissingJumpHostAddress { jump_host: String },

    #[error("Must pick a number between 1 and {max}!")]
    InvalidSelection { max: usize },

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to read inventory {}", path.display())]
    ReadInventory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid inventory: {0}")]
    ParseInventory(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
