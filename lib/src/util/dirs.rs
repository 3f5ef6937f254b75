//! Default locations for hop's config and data.
//!
//! Follows these rules, in order:
//!
//! - XDG base directory (all platforms if environment variable is set)
//! - Platform-specific well known directory (see [`dirs`])
//! - Home directory
//! - Current directory

use std::env;
use std::io;
use std::path::PathBuf;

const XDG_CONFIG_HOME: &str = "XDG_CONFIG_HOME";
const XDG_DATA_HOME: &str = "XDG_DATA_HOME";

/// Gets the config directory for `name`. Does not create it.
#[must_use]
pub fn config_dir(name: &str) -> PathBuf {
    base_dir(XDG_CONFIG_HOME, dirs::config_dir(), name)
}

/// Gets the data directory for `name`, creating it if needed.
///
/// # Errors
///
/// If the directory can't be created.
pub fn data_dir(name: &str) -> io::Result<PathBuf> {
    let dir = base_dir(XDG_DATA_HOME, dirs::data_dir(), name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn base_dir(xdg_var: &str, platform: Option<PathBuf>, name: &str) -> PathBuf {
    if let Some(path) = env::var_os(xdg_var).filter(|x| !x.is_empty()) {
        PathBuf::from(path).join(name)
    } else if let Some(path) = platform {
        path.join(name)
    } else if let Some(path) = dirs::home_dir() {
        path.join(format!(".{name}"))
    } else {
        PathBuf::from(format!(".{name}"))
    }
}
