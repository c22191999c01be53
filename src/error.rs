// src/error.rs
//
// Error kinds for the OSC engine. Only BindError, SendError and ConfigError end
// a session; everything else is isolated to a single message or binding.

use crate::host::ObjectRef;
use thiserror::Error;

/// Listen socket could not be opened.
#[derive(Debug, Error)]
#[error("could not listen on {address}:{port}: {source}")]
pub struct BindError {
    pub address: String,
    pub port: u16,
    #[source]
    pub source: std::io::Error,
}

/// Malformed datagram. Dropped and counted by the listener, never surfaced.
#[derive(Debug, Error)]
#[error("malformed OSC datagram ({len} bytes): {reason}")]
pub struct DecodeError {
    pub len: usize,
    pub reason: String,
}

/// A configured binding that could not be compiled against the host.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingResolutionError {
    #[error("{address}: target '{path}' not found")]
    TargetNotFound { address: String, path: String },

    #[error("{address}: '{path}' has no field '{field}'")]
    UnknownField {
        address: String,
        path: String,
        field: String,
    },

    #[error("{address}: field '{field}' is not a recognized data format")]
    UnrecognizedField { address: String, field: String },

    #[error("{address}: invalid argument index '{osc_index}'")]
    InvalidSelectors { address: String, osc_index: String },

    #[error("{address}: expected {expected} argument indices, got {actual}")]
    SelectorArity {
        address: String,
        expected: usize,
        actual: usize,
    },
}

/// Apply-time failure for one descriptor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriteError {
    #[error("argument {selector} missing ({available} received)")]
    MissingArgument { selector: usize, available: usize },

    #[error("argument {selector} has no host equivalent")]
    UnsupportedArgument { selector: usize },

    #[error("field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("component {index} out of range for '{field}' ({len} components)")]
    ComponentOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("target {0:?} no longer exists")]
    StaleTarget(ObjectRef),
}

/// Outbound socket failure.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("could not open outbound socket: {0}")]
    Socket(#[from] std::io::Error),

    #[error("send to {target} failed: {reason}")]
    Transmit { target: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("listen and destination ports must be different (both {0})")]
    SamePorts(u16),

    #[error("tick rate must be at least 1 ms")]
    TickRate,
}

/// Session-fatal errors reported by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input error: {0}")]
    Bind(#[from] BindError),

    #[error("output error: {0}")]
    Send(#[from] SendError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Binding persistence errors.
#[derive(Debug, Error)]
pub enum BindingFileError {
    #[error("could not access binding file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid binding file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binding file must contain a JSON object keyed by OSC address")]
    NotAnObject,
}
