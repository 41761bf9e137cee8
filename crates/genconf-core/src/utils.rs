//! Shared utility functions for genconf crates

use anyhow::{anyhow, Context};
use camino::Utf8PathBuf;

/// Name of the per-user settings directory below the home directory
pub const CONFIG_DIR_NAME: &str = ".genconf";

/// The user's home directory
///
/// A non-empty HOME wins over dirs::home_dir(), which reads the password
/// database and ignores overrides.
pub fn get_home_dir() -> anyhow::Result<Utf8PathBuf> {
    let home = match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => home.into(),
        _ => dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?,
    };

    Utf8PathBuf::from_path_buf(home)
        .map_err(|path| anyhow!("Home directory {} is not valid UTF-8", path.display()))
}

/// The per-user settings directory (~/.genconf)
pub fn config_dir() -> anyhow::Result<Utf8PathBuf> {
    get_home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .context("Failed to locate the genconf settings directory")
}
