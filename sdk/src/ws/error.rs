//! Transport errors.

use std::fmt;

/// Errors raised by the connection layer.
///
/// Only `connect()` and configuration checks return these; a socket lost
/// after it was established is reported through the connection state.
#[derive(Debug)]
pub enum WsError {
    /// The bridge could not be reached or refused the handshake.
    Connection {
        /// Endpoint that was dialed.
        url: String,
        /// Underlying failure.
        reason: String,
    },

    /// `close()` was called while the socket was opening.
    Closed,

    /// A command could not be encoded as JSON.
    Encode(String),

    /// Invalid configuration.
    InvalidConfig(String),
}

impl fmt::Display for WsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection { url, reason } => {
                write!(f, "cannot reach bridge at {}: {}", url, reason)
            }
            Self::Closed => write!(f, "connection closed while opening"),
            Self::Encode(msg) => write!(f, "failed to encode command: {}", msg),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for WsError {}

impl From<serde_json::Error> for WsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}
