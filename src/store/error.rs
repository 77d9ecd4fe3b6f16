//! # Store Error Types
//!
//! Errors raised by the company store backends. HTTP-level failures from the
//! hosted backend keep their structure when converted into the crate error;
//! everything else becomes `Error::Database`.

use crate::error::Error as CrateError;
use crate::store::CompanyId;
use thiserror::Error;

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Response body
        message: String,
    },

    /// Credentials rejected
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Rate limit exceeded after all retries
    #[error("Rate limit exceeded. Please retry after {retry_after_secs} seconds")]
    RateLimit {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Invalid project URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// LibSQL error
    #[error("LibSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Data error
    #[error("Data error: {0}")]
    Data(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// No company with this id
    #[error("Company not found: {0}")]
    NotFound(CompanyId),
}

impl From<StoreError> for CrateError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Http(e) => CrateError::Http(e),
            StoreError::Api {
                status_code,
                message,
            } => CrateError::Api {
                status_code,
                message,
            },
            StoreError::Auth(message) => CrateError::Auth(message),
            StoreError::RateLimit { retry_after_secs } => CrateError::RateLimit { retry_after_secs },
            _ => CrateError::Database(err.to_string()),
        }
    }
}
