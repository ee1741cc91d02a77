//! Error taxonomy for calls against the backend.
//!
//! Both panels collapse these into a single user-visible outcome, but the
//! variants stay distinct so the log records what actually went wrong.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, DNS).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: String },

    /// A success status with a body that does not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The task driving the request panicked or was aborted.
    #[error("Request task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
