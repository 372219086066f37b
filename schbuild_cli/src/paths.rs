//! Centralized path management for schbuild
//!
//! The user configuration lives in a per-user config directory; project
//! configuration is a `schbuild.toml` next to the sources.

use std::path::{Path, PathBuf};

/// The name of the application config directory used across all platforms
const APP_DIR: &str = "schbuild";

/// The name of the user configuration file
const CONFIG_FILE: &str = "config.toml";

/// The name of the per-project configuration file
pub const PROJECT_CONFIG_FILE: &str = "schbuild.toml";

/// Returns the path to the configuration directory
///
/// `XDG_CONFIG_HOME` wins on Unix-like systems. Otherwise the platform config
/// directory is used:
/// - `~/.config/schbuild` on Linux
/// - `~/Library/Application Support/schbuild` on macOS
/// - `%APPDATA%\schbuild` on Windows
///
/// Falls back to `.schbuild` in the current directory.
pub fn get_config_dir() -> PathBuf {
    #[cfg(not(target_os = "windows"))]
    if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg_config).join(APP_DIR);
    }

    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".schbuild"))
}

/// Returns the path to the user configuration file
pub fn get_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILE)
}

/// Returns the project configuration file for a build directory
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(PROJECT_CONFIG_FILE)
}
