//! Configuration loading and management

use std::path::PathBuf;
use anyhow::Result;

/// Key label used when the environment provides none.
pub const DEFAULT_PRIMARY_KEY: &str = "<f12>";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Informational shortcut label shown in status output
    pub primary_key: String,

    /// Reserved input-device path; unused by the D-Bus backend
    pub device_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let primary_key = std::env::var("HYPRWHSPR_PRIMARY_KEY")
            .unwrap_or_else(|_| DEFAULT_PRIMARY_KEY.to_string());

        let device_path = std::env::var("HYPRWHSPR_DEVICE_PATH")
            .ok()
            .map(PathBuf::from);

        Ok(Self {
            primary_key,
            device_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::load().unwrap();
        if std::env::var("HYPRWHSPR_PRIMARY_KEY").is_err() {
            assert_eq!(config.primary_key, DEFAULT_PRIMARY_KEY);
        }
    }
}
