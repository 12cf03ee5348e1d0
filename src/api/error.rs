//! Client Error Types

use thiserror::Error;

/// Shown when the backend fails without an error message of its own
pub const GENERIC_FAILURE: &str = "The mockup service could not complete the request. Please try again.";

/// Errors that can occur when talking to the mockup backend
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Backend unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The backend answered `success: false`
    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::Unavailable
        } else {
            ClientError::Request(e)
        }
    }

    /// Message suitable for an inline error region or transcript entry
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Api { .. } => GENERIC_FAILURE.to_string(),
            ClientError::Rejected(message) => message.clone(),
            ClientError::Unavailable => {
                "Could not reach the mockup service. Please try again.".to_string()
            }
            ClientError::Timeout => "The mockup service took too long to respond.".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_backend_text() {
        let err = ClientError::Api {
            status: 400,
            message: "Prompt is required".into(),
        };
        assert_eq!(err.user_message(), "Prompt is required");
        assert_eq!(err.to_string(), "API error 400: Prompt is required");
    }

    #[test]
    fn test_empty_api_message_falls_back() {
        let err = ClientError::Api {
            status: 502,
            message: String::new(),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }
}
