//! Client error types.

use std::fmt;

use crate::error::SdkError;
use crate::ws::WsError;

/// Errors returned by [`super::SyncClient`].
#[derive(Debug)]
pub enum ClientError {
    /// The transport failed to start or connect.
    Transport(WsError),

    /// A command failed local validation.
    Command(SdkError),

    /// Invalid configuration.
    InvalidConfig(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::Command(e) => write!(f, "command rejected: {}", e),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Command(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<WsError> for ClientError {
    fn from(err: WsError) -> Self {
        Self::Transport(err)
    }
}

impl From<SdkError> for ClientError {
    fn from(err: SdkError) -> Self {
        Self::Command(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_client_error_transport() {
        let err = ClientError::from(WsError::Closed);
        assert_eq!(
            err.to_string(),
            "transport error: connection closed while opening"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_client_error_command() {
        let err = ClientError::from(SdkError::InvalidCount(0));
        assert!(matches!(err, ClientError::Command(SdkError::InvalidCount(0))));
        assert!(err.to_string().starts_with("command rejected: "));
    }

    #[test]
    fn test_client_error_invalid_config() {
        let err = ClientError::InvalidConfig("rates_count must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: rates_count must be positive"
        );
        assert!(err.source().is_none());
    }
}
