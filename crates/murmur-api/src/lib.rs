//! API clients for murmur.
//!
//! Two thin HTTP clients: one for the multipart speech-to-text endpoint and
//! one for the chat-completion cleanup pass, plus the response-shape
//! classification the pipeline relies on.

mod correction;
mod transcription;

pub use correction::{CorrectionClient, CorrectionConfig};
pub use transcription::{TranscriptionBody, TranscriptionClient, TranscriptionConfig};

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Errors that can occur while talking to either endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Status {
        status: StatusCode,
        headers: Box<HeaderMap>,
        body: String,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response decoded, but not into a shape we can use.
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

impl ApiError {
    /// Render the failure the way it is persisted to the output files:
    /// response data, status, and headers when a response exists, otherwise
    /// the bare error message.
    pub fn diagnostic(&self) -> String {
        match self {
            ApiError::Status {
                status,
                headers,
                body,
            } => format!(
                "Error response data: {body}\nError response status: {status}\nError response headers: {headers:?}"
            ),
            ApiError::Network(err) => format!("Error message: {err}"),
            ApiError::Shape(detail) => format!("Unexpected response shape: {detail}"),
        }
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
