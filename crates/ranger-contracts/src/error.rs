//! Error types for the rangersync reconciliation pipeline.
//!
//! All fallible operations return `RangerResult<T>`. Variants carry the status
//! code or underlying cause so a failed operation can be diagnosed without
//! re-running it.

use thiserror::Error;

/// The unified error type for rangersync.
#[derive(Debug, Error)]
pub enum RangerError {
    /// The remote service has no policy matching the request.
    ///
    /// Benign during Read (the policy is dropped from state), fatal elsewhere.
    #[error("policy not found: {what}")]
    NotFound { what: String },

    /// The remote service answered with a non-success status other than 404.
    #[error("Ranger API returned unexpected status code {status}: {body}")]
    ApiError { status: u16, body: String },

    /// The request never produced an HTTP response (DNS, refused, TLS, timeout).
    #[error("Ranger API unreachable: {reason}")]
    ApiUnreachable { reason: String },

    /// A response body did not decode as the expected policy shape.
    #[error("could not decode API response: {reason}")]
    DecodeError { reason: String },

    /// Locally detectable bad input, rejected before any request is sent.
    #[error("validation error: {reason}")]
    ValidationError { reason: String },

    /// Transport configuration is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A reconciler operation failed; wraps the underlying cause.
    #[error("{operation} failed: {source}")]
    OperationFailed {
        operation: &'static str,
        #[source]
        source: Box<RangerError>,
    },
}

impl RangerError {
    /// Wrap `self` with the name of the reconciler operation that failed.
    pub fn during(self, operation: &'static str) -> Self {
        RangerError::OperationFailed {
            operation,
            source: Box::new(self),
        }
    }

    /// True if this error (or the error it wraps) is a `NotFound`.
    pub fn is_not_found(&self) -> bool {
        match self {
            RangerError::NotFound { .. } => true,
            RangerError::OperationFailed { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// The HTTP status carried by an `ApiError`, looking through wrappers.
    pub fn status(&self) -> Option<u16> {
        match self {
            RangerError::ApiError { status, .. } => Some(*status),
            RangerError::NotFound { .. } => Some(404),
            RangerError::OperationFailed { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the rangersync crates.
pub type RangerResult<T> = Result<T, RangerError>;
