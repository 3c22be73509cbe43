//! Where ligatures-limited keeps its files
//!
//! `$LIGATURES_LIMITED_HOME` wins when set. Otherwise the platform config
//! root (`$XDG_CONFIG_HOME` or `~/.config` on Unix/macOS, `%APPDATA%` on
//! Windows) plus a `ligatures-limited/` subdirectory.

use std::io;
use std::path::PathBuf;

const APP_DIR: &str = "ligatures-limited";
const HOME_VAR: &str = "LIGATURES_LIMITED_HOME";

fn platform_config_root() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else {
        std::env::var_os("XDG_CONFIG_HOME")
            .filter(|root| !root.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
    }
}

/// Base directory for settings and logs
pub fn config_dir() -> Option<PathBuf> {
    match std::env::var_os(HOME_VAR) {
        Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
        _ => platform_config_root().map(|root| root.join(APP_DIR)),
    }
}

/// Settings file read by `Settings::load`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Create the logs directory if needed and return it
pub fn ensure_logs_dir() -> io::Result<PathBuf> {
    let logs = logs_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory available"))?;
    std::fs::create_dir_all(&logs)?;
    Ok(logs)
}
