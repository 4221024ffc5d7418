//! Error types for the gNMI client.

use thiserror::Error;

/// Result type alias using [`GnmiError`].
pub type Result<T> = std::result::Result<T, GnmiError>;

/// Errors surfaced by the gNMI client.
#[derive(Debug, Error)]
pub enum GnmiError {
    /// The target string could not be parsed into host and port.
    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// A value did not resolve against a protocol enum.
    #[error("{field}={value} is not a valid {enum_name} value. Try any of {options:?}.")]
    InvalidEnumValue {
        field: String,
        value: String,
        enum_name: &'static str,
        options: Vec<&'static str>,
    },

    /// Channel construction failed (bad credential material, bad endpoint).
    #[error("Failed to construct channel: {0}")]
    ChannelConstruction(String),

    /// A request was built from an invalid parameter combination.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A subscription session gave up after exhausting its retry budget, or
    /// hit a non-recoverable stream error.
    #[error("Subscription session terminated: {0}")]
    SessionTerminated(String),

    /// An operation was attempted on a session that is already closed.
    #[error("Subscription session is closed")]
    SessionClosed,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// RPC failure reported by the target.
    #[error("RPC error: {0}")]
    Rpc(#[from] tonic::Status),

    /// Transport-level failure from the underlying channel.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// I/O error (certificate files, config files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GnmiError {
    /// Whether a stream-level error should trigger reconnection rather than
    /// terminating the session.
    pub fn is_transient(&self) -> bool {
        match self {
            GnmiError::Rpc(status) => matches!(
                status.code(),
                tonic::Code::Unavailable | tonic::Code::DeadlineExceeded | tonic::Code::Aborted
            ),
            GnmiError::Transport(_) => true,
            _ => false,
        }
    }
}
