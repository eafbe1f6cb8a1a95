//! Error types for document validation.

use std::path::PathBuf;
use thiserror::Error;

/// First error raised while validating a document against a schema.
///
/// Every variant except `Custom` carries the dotted path of the offending
/// field; values are rendered as compact JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Required field missing (absent or `null`).
    #[error("field `{field}` is required")]
    Required { field: String },

    /// Value is not of the primitive kind the schema expects.
    #[error("field `{field}` value {value} is not {expected}")]
    TypeMismatch {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// Value has the right kind but fails a bound, enumeration, pattern or
    /// custom check.
    #[error("field `{field}` value {value} {reason}")]
    Constraint {
        field: String,
        value: String,
        reason: String,
    },

    /// Keys or items traversal attempted on a non-composite value.
    #[error("field `{field}` value {value} is not {expected}")]
    Shape {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// Raised by caller-supplied rules.
    #[error("{message}")]
    Custom { message: String },
}

impl ValidationError {
    /// Error for a custom rule.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    /// Dotted path of the field the error was raised on.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Required { field }
            | Self::TypeMismatch { field, .. }
            | Self::Constraint { field, .. }
            | Self::Shape { field, .. } => Some(field),
            Self::Custom { .. } => None,
        }
    }
}

/// Errors of the document-level entry points (bytes, files, HTTP bodies).
#[derive(Debug, Error)]
pub enum Error {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "http")]
    #[error("cannot read request body: {source}")]
    Body {
        #[source]
        source: axum::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode document: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    // Validation errors (exit code 1)
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl Error {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::FileNotFound { .. } | Error::ReadError { .. } => 3,
            #[cfg(feature = "http")]
            Error::Body { .. } => 3,
            Error::InvalidJson { .. } | Error::Encode { .. } => 2,
            Error::Invalid(_) => 1,
        }
    }
}
