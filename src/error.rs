//! Controller Error Types

use thiserror::Error;

use crate::api::ClientError;
use crate::inflight::Operation;

/// Errors surfaced by the conversation, viewer, ticket, and project controllers
#[derive(Error, Debug)]
pub enum StudioError {
    /// Input rejected before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The same operation already has a request outstanding
    #[error("{0} is already in progress")]
    Busy(Operation),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudioError {
    /// Message suitable for an inline error region
    pub fn user_message(&self) -> String {
        match self {
            StudioError::Client(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub type StudioResult<T> = Result<T, StudioError>;
