//! Parse error types.
//!
//! Every accessor failure is a [`ParseError`]. Matching on the enum (or on
//! [`ParseError::kind`]) differentiates the four failure kinds; handling the
//! enum as a whole catches any validation failure.

use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Result type alias using [`ParseError`].
pub type ParseResult<T> = Result<T, ParseError>;

/// Kind of parse failure, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The key is absent from the input.
    MissingKey,
    /// The value exists but has the wrong runtime type.
    InvalidType,
    /// The value exists but is not an instance of the required class.
    InvalidInstanceOf,
    /// The value has a convertible type but conversion failed.
    Coercion,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey => write!(f, "missing_key"),
            Self::InvalidType => write!(f, "invalid_type"),
            Self::InvalidInstanceOf => write!(f, "invalid_instance_of"),
            Self::Coercion => write!(f, "coercion"),
        }
    }
}

/// Error raised when a typed value cannot be extracted from an input.
///
/// The message text is stable and may be shown to end users.
///
/// # Example
///
/// ```rust
/// use keyparse::{ErrorKind, ParseError};
///
/// let err = ParseError::invalid_type("age", "string", "number");
/// assert_eq!(err.kind(), ErrorKind::InvalidType);
/// assert_eq!(err.to_string(), r#"Key "age" expected string but got number"#);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The key does not exist.
    #[error("Key \"{key}\" does not exist")]
    MissingKey {
        /// The requested key.
        key: String,
    },

    /// The value's runtime type does not match the accessor.
    #[error("Key \"{key}\" expected {expected} but got {actual}")]
    InvalidType {
        /// The requested key.
        key: String,
        /// The type the accessor requires.
        expected: String,
        /// The type that was found.
        actual: String,
    },

    /// The value is not an instance of the required class.
    #[error("Key \"{key}\" expected instance of {class_name}")]
    InvalidInstanceOf {
        /// The requested key.
        key: String,
        /// Display name of the required class.
        class_name: String,
    },

    /// The value could not be converted to the target type.
    #[error("Key \"{key}\" could not be coerced to {target}")]
    Coercion {
        /// The requested key.
        key: String,
        /// The type conversion was attempted to.
        target: String,
    },
}

impl ParseError {
    /// Creates an error for a missing key.
    #[must_use]
    pub fn missing_key(key: impl fmt::Display) -> Self {
        Self::MissingKey {
            key: key.to_string(),
        }
    }

    /// Creates an error for a runtime type mismatch.
    #[must_use]
    pub fn invalid_type(
        key: impl fmt::Display,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Self::InvalidType {
            key: key.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Creates an error for a failed class check.
    #[must_use]
    pub fn invalid_instance_of(key: impl fmt::Display, class_name: impl Into<String>) -> Self {
        Self::InvalidInstanceOf {
            key: key.to_string(),
            class_name: class_name.into(),
        }
    }

    /// Creates an error for a failed conversion.
    #[must_use]
    pub fn coercion(key: impl fmt::Display, target: impl Into<String>) -> Self {
        Self::Coercion {
            key: key.to_string(),
            target: target.into(),
        }
    }

    /// Returns the kind of failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingKey { .. } => ErrorKind::MissingKey,
            Self::InvalidType { .. } => ErrorKind::InvalidType,
            Self::InvalidInstanceOf { .. } => ErrorKind::InvalidInstanceOf,
            Self::Coercion { .. } => ErrorKind::Coercion,
        }
    }

    /// Returns the key that failed.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::MissingKey { key }
            | Self::InvalidType { key, .. }
            | Self::InvalidInstanceOf { key, .. }
            | Self::Coercion { key, .. } => key,
        }
    }

    /// Returns the expected type or class, if the kind carries one.
    #[must_use]
    pub fn expected(&self) -> Option<&str> {
        match self {
            Self::MissingKey { .. } => None,
            Self::InvalidType { expected, .. } => Some(expected),
            Self::InvalidInstanceOf { class_name, .. } => Some(class_name),
            Self::Coercion { target, .. } => Some(target),
        }
    }

    /// Returns the type that was actually found, if known.
    #[must_use]
    pub fn actual(&self) -> Option<&str> {
        match self {
            Self::InvalidType { actual, .. } => Some(actual),
            _ => None,
        }
    }

    /// Returns the HTTP status code for reporting this error to a client.
    ///
    /// Every kind describes bad client input.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::MissingKey => "MISSING_KEY",
            ErrorKind::InvalidType => "INVALID_TYPE",
            ErrorKind::InvalidInstanceOf => "INVALID_INSTANCE_OF",
            ErrorKind::Coercion => "COERCION_FAILED",
        }
    }

    /// Emits a debug event for this error and returns it unchanged.
    pub(crate) fn traced(self) -> Self {
        tracing::debug!(key = %self.key(), kind = %self.kind(), "{}", self);
        self
    }
}
