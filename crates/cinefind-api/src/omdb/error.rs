//! Error taxonomy for OMDb requests.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the OMDb API.
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum OmdbError {
    /// Transport-level failure (DNS, connection reset, TLS, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status without an OMDb error body.
    #[error("Network error: {status}")]
    Http {
        /// Status returned by the server.
        status: reqwest::StatusCode,
    },

    /// OMDb answered with `Response: "False"`.
    #[error("{0}")]
    Api(String),

    /// The response body was not the expected JSON.
    #[error("failed to decode OMDb response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Superseded by a newer request of the same kind, or explicitly aborted.
    #[error("request canceled")]
    Canceled,

    /// No response within the configured timeout.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl OmdbError {
    /// Whether the error is a cancellation or timeout rather than a failure.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_grouping() {
        // Arrange & Act & Assert
        assert!(OmdbError::Canceled.is_cancellation());
        assert!(OmdbError::Timeout(Duration::from_secs(10)).is_cancellation());
        assert!(!OmdbError::Api(String::from("Movie not found!")).is_cancellation());
    }

    #[test]
    fn test_display_messages() {
        // Arrange
        let http = OmdbError::Http {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        };
        let api = OmdbError::Api(String::from("Incorrect IMDb ID."));
        let timeout = OmdbError::Timeout(Duration::from_millis(250));

        // Act & Assert
        assert_eq!(http.to_string(), "Network error: 500 Internal Server Error");
        assert_eq!(api.to_string(), "Incorrect IMDb ID.");
        assert_eq!(timeout.to_string(), "request timed out after 250ms");
    }
}
