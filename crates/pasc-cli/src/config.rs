//! Optional `pasc.toml` configuration. Every field has a default, so a
//! missing or absent file is equivalent to `Config::default()`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

pub const CONFIG_FILE_NAME: &str = "pasc.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Dump the global environment after a successful run.
    #[serde(default)]
    pub show_globals_on_success: bool,

    /// Maximum function-call recursion depth before a stack-overflow
    /// `RuntimeError` is raised.
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_globals_on_success: false,
            max_call_depth: default_max_call_depth(),
        }
    }
}

fn default_max_call_depth() -> u32 {
    1000
}

impl Config {
    /// Loads `pasc.toml` from the current directory, falling back to
    /// defaults if it does not exist.
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| CliError::ReadSource {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&text).map_err(|e| CliError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_standard_call_depth() {
        assert_eq!(Config::default().max_call_depth, 1000);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let cfg: Config = toml::from_str("show_globals_on_success = true").unwrap();
        assert!(cfg.show_globals_on_success);
        assert_eq!(cfg.max_call_depth, 1000);
    }
}
