//! Error types shared across the engine and optimization layers

use crate::models::EngineStatus;
use thiserror::Error;

/// Failure reported by an external sink (signal, status, notification, market data)
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("sink rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        SinkError::Transport(err.to_string())
    }
}

/// Failure of the durable parameter store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("parameter store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parameter store payload is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("parameter store unavailable: {0}")]
    Unavailable(String),
}

/// Failure raised by a strategy while assessing a snapshot
#[derive(Debug, Error)]
pub enum EngineError {
    /// Recoverable; the engine stays running and is polled again next tick.
    #[error("transient engine failure: {0}")]
    Transient(String),

    /// Unrecoverable; the engine moves to `Error` until explicitly restarted.
    #[error("engine fault: {0}")]
    Fault(String),
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("unknown engine '{0}'")]
    UnknownEngine(String),

    #[error("engine '{0}' is already registered")]
    DuplicateEngine(String),

    #[error("engine '{id}' cannot transition from {from:?} to {to:?}")]
    InvalidTransition {
        id: String,
        from: EngineStatus,
        to: EngineStatus,
    },
}

/// Fatal configuration problem detected before the runtime starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
