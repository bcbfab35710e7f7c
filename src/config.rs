use std::fs;
use std::path::Path;

use log::warn;
use serde::Deserialize;

fn default_listening_port() -> u16 {
    9000
}

fn default_target_addr() -> String {
    "127.0.0.1:9000".to_string()
}

/// OSC settings for the demo programs, read from `config.json`. Missing
/// fields fall back to their defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct OscConfig {
    #[serde(default = "default_listening_port")]
    pub listening_port: u16,
    #[serde(default = "default_target_addr")]
    pub target_addr: String,
    #[serde(default)]
    pub debug: bool,
}

impl Default for OscConfig {
    fn default() -> Self {
        OscConfig {
            listening_port: default_listening_port(),
            target_addr: default_target_addr(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub osc: OscConfig,
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is missing
    /// or malformed (a warning is logged in the malformed case).
    pub fn load_or_default(path: &Path) -> Config {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("ignoring malformed {}: {}", path.display(), e);
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }
}
