use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

/// Terminal failure of a subscribe or send request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelayError {
    /// Required fields missing or no resolvable address. Detected before
    /// any upstream call.
    #[error("{0}")]
    InvalidRequest(String),
    /// The credential provider could not produce a bearer token
    #[error("{0}")]
    Credential(String),
    /// The messaging provider rejected the call. Holds the provider's
    /// message as-is.
    #[error("{0}")]
    Transport(String),
    #[error("request to messaging provider timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::Credential(_) | RelayError::Transport(_) | RelayError::Timeout(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
