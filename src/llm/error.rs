//! Errors raised at the model transport boundary

use std::time::Duration;

use thiserror::Error;

/// Result alias for provider calls
pub type LlmResult<T> = Result<T, LlmError>;

/// Failure talking to a model provider
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider is misconfigured (missing key, bad URL)
    #[error("provider not configured: {reason}")]
    Configuration { reason: String },

    /// Network or protocol failure before a response arrived
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// The request exceeded the configured timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The provider answered with a body we could not decode
    #[error("malformed response: {reason}")]
    Decode { reason: String },
}

impl LlmError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Configuration { .. } | Self::Decode { .. } => false,
        }
    }

    /// Classify a reqwest failure
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}
