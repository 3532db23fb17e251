//! Error types for the docwarden-core library.

use thiserror::Error;

/// Main error type for the docwarden library.
#[derive(Error, Debug)]
pub enum DocwardenError {
    /// Document AI or credential error.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// Template mapping error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Malformed JSON in a template.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while talking to the document extraction service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No usable credentials file could be found or parsed.
    #[error("credentials: {0}")]
    Credentials(String),

    /// The OAuth token exchange was rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors related to the import template.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A key the mapping rules write through is absent.
    #[error("template is missing key: {0}")]
    MissingKey(String),

    /// A value expected to be a JSON object (or array) has another type.
    #[error("template value at {path} must be {expected}")]
    WrongType { path: String, expected: &'static str },
}

/// Result type for the docwarden library.
pub type Result<T> = std::result::Result<T, DocwardenError>;
