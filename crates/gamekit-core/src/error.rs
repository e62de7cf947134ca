use thiserror::Error;

use crate::function::ArgType;

/// Unified error type for every gamekit crate.
#[derive(Error, Debug)]
pub enum GameError {
    // ── Argument validation ────────────────────────────────────
    #[error("{function}: expected {expected} arguments, got {actual}")]
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("{function}: argument {argument} must be of type {expected}")]
    ArgumentType {
        function: String,
        argument: String,
        expected: ArgType,
    },

    #[error("{function}: duplicate argument name {argument}")]
    DuplicateArgument { function: String, argument: String },

    // ── Registry errors ────────────────────────────────────────
    #[error("function '{0}' not found")]
    UnknownFunction(String),

    // ── Request errors ─────────────────────────────────────────
    #[error("request failed: {function}: {reason}")]
    RequestFailed { function: String, reason: String },

    #[error("transport error: {message}")]
    Transport {
        message: String,
        /// Response body attached to the failure, if the server sent one.
        body: Option<serde_json::Value>,
    },

    // ── Webhook errors ─────────────────────────────────────────
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl GameError {
    /// Shorthand for a transport failure without a response body.
    pub fn transport(message: impl Into<String>) -> Self {
        GameError::Transport {
            message: message.into(),
            body: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
