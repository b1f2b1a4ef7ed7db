//! Error type definitions for the subtitle companion service
//!
//! This module defines the error hierarchy used outside the lookup fast
//! path. Provider failures are modelled here as well, but they are always
//! recovered inside the resolver and never reach a caller.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Metadata provider errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Persistence and file storage errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Web layer errors
    #[error("Web error: {0}")]
    Web(#[from] WebError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Failures talking to an external metadata provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The request was rejected before it was sent
    #[error("Invalid request for {provider}: {message}")]
    InvalidRequest { provider: String, message: String },

    /// The request exceeded the configured timeout
    #[error("Request timed out: {url}")]
    Timeout { url: String },

    /// Connection or transport failure
    #[error("Provider unavailable: {url} - {message}")]
    Unavailable { url: String, message: String },

    /// The provider answered with a non-success status
    #[error("HTTP error: {status} from {url}")]
    Http { status: u16, url: String },

    /// The provider answered but the payload lacked the expected fields
    #[error("Malformed response from {url}: {message}")]
    Malformed { url: String, message: String },
}

/// Persistence layer errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem failures
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot (de)serialization failures
    #[error("Serialization failed for {path}: {source}")]
    Serialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Web layer specific errors
#[derive(Error, Debug)]
pub enum WebError {
    /// Invalid request format
    #[error("Invalid request: {field} - {message}")]
    InvalidRequest { field: String, message: String },

    /// Request payload too large
    #[error("Payload too large: {size} bytes (max: {max_size})")]
    PayloadTooLarge { size: usize, max_size: usize },

    /// Unsupported upload type
    #[error("Unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },
}

impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl ProviderError {
    pub fn invalid_request<P: Into<String>, M: Into<String>>(provider: P, message: M) -> Self {
        Self::InvalidRequest {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn malformed<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Malformed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Classify a transport error from the HTTP client
    pub fn from_transport(url: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Unavailable {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

impl StoreError {
    pub fn io<P: AsRef<std::path::Path>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn serialization<P: AsRef<std::path::Path>>(path: P, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

impl WebError {
    /// Create an invalid request error
    pub fn invalid_request<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }
}
