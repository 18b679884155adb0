/*!
 * Optional TOML configuration, read once at startup and passed down
 * explicitly.
 */
use std::path::{Path, PathBuf};

use serde_derive::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine command, e.g. "dnf" or "dnf5".
    pub pkg_manager: String,
    pub privilege_wrapper: String,
    /// Strongest match printed last, directly above the prompt.
    pub reverse_display: bool,
    pub color: bool,
}

impl Default for Config {
    fn default() -> Config {
        return Config {
            pkg_manager: "dnf".to_string(),
            privilege_wrapper: "sudo".to_string(),
            reverse_display: true,
            color: true,
        };
    }
}

impl Config {
    /// Loads the user config, falling back to defaults when it does not
    /// exist. A file that exists but will not parse is ignored with a
    /// warning rather than killing an interactive session.
    pub fn load() -> Config {
        let Some(path) = Config::path() else {
            return Config::default();
        };
        return Config::load_path(&path);
    }

    pub fn path() -> Option<PathBuf> {
        return dirs::config_dir().map(|dir| dir.join("acheron").join("config.toml"));
    }

    fn load_path(path: &Path) -> Config {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Config::default(),
        };
        return match toml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed config {}: {err}", path.display());
                Config::default()
            }
        };
    }
}
