//! Filesystem locations.

use dirs::home_dir;
use std::path::PathBuf;

/// Returns the relbin home directory, or None if the user's home cannot be resolved.
///
/// `RELBIN_HOME` overrides the default of `~/.relbin`.
pub fn try_relbin_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("RELBIN_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".relbin"))
}

/// Config file named explicitly by `RELBIN_CONFIG`, if set.
pub fn config_override() -> Option<PathBuf> {
    std::env::var_os("RELBIN_CONFIG").map(PathBuf::from)
}

/// Default config file location: `<home>/relbin.toml`
pub fn default_config_path() -> Option<PathBuf> {
    try_relbin_home().map(|h| h.join("relbin.toml"))
}

/// Binary installation target: `<home>/.binary`
pub fn default_install_dir() -> Option<PathBuf> {
    try_relbin_home().map(|h| h.join(".binary"))
}
