// src/config/config_types.rs
//
// Config types for the engine. Every key is optional in config.toml.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// interface to listen on, 0.0.0.0 for all of them
    pub listen_address: String,
    pub listen_port: u16,
    /// machine receiving outbound messages
    pub destination_address: String,
    pub destination_port: u16,
    /// upper bound on how long stopping the listener takes
    pub receive_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1".to_string(),
            listen_port: 9001,
            destination_address: "127.0.0.1".to_string(),
            destination_port: 9002,
            receive_timeout_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tick_rate_ms: u64,
    /// log improper messages and expose the last received address
    pub monitor: bool,
    /// start the engine as soon as bindings are loaded
    pub autorun: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 10,
            monitor: false,
            autorun: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BindingsConfig {
    pub file: String,
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            file: "bindings.json".to_string(),
        }
    }
}
