// src/config/config_load.rs
//
// loading of config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::config_types::{BindingsConfig, EngineConfig, NetworkConfig};
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub engine: EngineConfig,
    pub bindings: BindingsConfig,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        // First try to load from the executable's directory
        if let Some(exe_config) = Self::load_from_exe_dir() {
            return Ok(exe_config);
        }

        // Fallback to loading from the current working directory
        Self::load_from_working_dir()
    }

    fn load_from_exe_dir() -> Option<Self> {
        let exe_path = std::env::current_exe().ok()?;
        let exe_dir = exe_path.parent()?;
        let config_path = exe_dir.join("config.toml");

        if config_path.exists() {
            let content = fs::read_to_string(&config_path).ok()?;
            match Self::from_toml(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    log::warn!("ignoring {}: {}", config_path.display(), e);
                    None
                }
            }
        } else {
            None
        }
    }

    fn load_from_working_dir() -> Result<Self, ConfigError> {
        let content = fs::read_to_string("config.toml")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.listen_port == self.network.destination_port {
            return Err(ConfigError::SamePorts(self.network.listen_port));
        }
        if self.engine.tick_rate_ms < 1 {
            return Err(ConfigError::TickRate);
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.engine.tick_rate_ms.max(1))
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.network.receive_timeout_ms.max(1))
    }

    pub fn resolve_bindings_path(&self) -> PathBuf {
        if Path::new(&self.bindings.file).is_absolute() {
            PathBuf::from(&self.bindings.file)
        } else {
            // If path is relative, resolve it relative to the executable or working directory
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .map(|exe_dir| exe_dir.join(&self.bindings.file))
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from(&self.bindings.file))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.network.listen_address, "127.0.0.1");
        assert_eq!(config.network.listen_port, 9001);
        assert_eq!(config.network.destination_port, 9002);
        assert_eq!(config.engine.tick_rate_ms, 10);
        assert!(!config.engine.monitor);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [network]
            listen_address = "0.0.0.0"
            listen_port = 8000

            [engine]
            monitor = true
            "#,
        )
        .unwrap();
        assert_eq!(config.network.listen_address, "0.0.0.0");
        assert_eq!(config.network.listen_port, 8000);
        assert_eq!(config.network.destination_port, 9002);
        assert!(config.engine.monitor);
        assert_eq!(config.tick_interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_ports_must_differ() {
        let mut config = Config::default();
        config.network.destination_port = config.network.listen_port;
        assert!(matches!(config.validate(), Err(ConfigError::SamePorts(9001))));
    }

    #[test]
    fn test_tick_rate_floor() {
        let mut config = Config::default();
        config.engine.tick_rate_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::TickRate)));
    }

    #[test]
    fn test_out_of_range_port_is_a_parse_error() {
        let result = Config::from_toml("[network]\nlisten_port = 70000\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
