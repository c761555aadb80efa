//! Error types for s3cost
//!
//! This module defines the error types used throughout the s3cost crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use s3cost_core::error::{S3CostError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to S3CostError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of an error returned by an AWS API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Missing, invalid, or expired credentials
    Authentication,
    /// Credentials are valid but lack the required permission
    Permission,
    /// Request was throttled
    RateLimit,
    /// Anything else, including network failures
    Other,
}

impl ApiErrorKind {
    /// Classify an AWS error code
    ///
    /// # Examples
    /// ```
    /// use s3cost_core::error::ApiErrorKind;
    ///
    /// assert_eq!(ApiErrorKind::from_code(Some("ThrottlingException")), ApiErrorKind::RateLimit);
    /// assert_eq!(ApiErrorKind::from_code(Some("AccessDenied")), ApiErrorKind::Permission);
    /// assert_eq!(ApiErrorKind::from_code(None), ApiErrorKind::Other);
    /// ```
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some(
                "UnrecognizedClientException"
                | "InvalidClientTokenId"
                | "InvalidAccessKeyId"
                | "SignatureDoesNotMatch"
                | "ExpiredToken"
                | "ExpiredTokenException"
                | "MissingAuthenticationToken"
                | "IncompleteSignature"
                | "AuthFailure",
            ) => ApiErrorKind::Authentication,
            Some(
                "AccessDenied"
                | "AccessDeniedException"
                | "UnauthorizedOperation"
                | "AllAccessDisabled"
                | "OptInRequired",
            ) => ApiErrorKind::Permission,
            Some(
                "Throttling"
                | "ThrottlingException"
                | "ThrottledException"
                | "TooManyRequestsException"
                | "RequestLimitExceeded"
                | "LimitExceededException"
                | "SlowDown",
            ) => ApiErrorKind::RateLimit,
            _ => ApiErrorKind::Other,
        }
    }

    /// Classify an error from its code, falling back to the message
    ///
    /// Credential resolution failures happen before a request is sent and
    /// carry no error code, only a message about missing credentials.
    pub fn classify(code: Option<&str>, message: &str) -> Self {
        match Self::from_code(code) {
            ApiErrorKind::Other if message.to_ascii_lowercase().contains("credentials") => {
                ApiErrorKind::Authentication
            }
            kind => kind,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Authentication => write!(f, "authentication failed"),
            ApiErrorKind::Permission => write!(f, "permission denied"),
            ApiErrorKind::RateLimit => write!(f, "rate limited"),
            ApiErrorKind::Other => write!(f, "request failed"),
        }
    }
}

/// Main error type for s3cost operations
#[derive(Error, Debug)]
pub enum S3CostError {
    /// Error returned by an AWS API
    #[error("{service} {kind}: {message}")]
    ExternalApi {
        /// AWS service that produced the error
        service: &'static str,
        /// Classification of the upstream error
        kind: ApiErrorKind,
        /// Upstream error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// CSV export could not be written
    #[error("Failed to write {}: {source}", path.display())]
    FileWrite {
        /// Target file
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Upstream payload could not be mapped into a domain record
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl S3CostError {
    /// Build an external API error
    pub fn external(service: &'static str, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        S3CostError::ExternalApi {
            service,
            kind,
            message: message.into(),
        }
    }

    /// Classification of an external API error, if this is one
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            S3CostError::ExternalApi { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether the error is transient throttling worth retrying
    pub fn is_rate_limited(&self) -> bool {
        self.api_kind() == Some(ApiErrorKind::RateLimit)
    }
}

/// Convenience type alias for Results in s3cost
///
/// # Example
///
/// ```
/// use s3cost_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, S3CostError>;
