//! # Errors and diagnostics
//!
//! Nothing in the extract → compile → transform pipeline fails. Bad input degrades:
//! an undecodable parameter is skipped and reported as a [`ParseDiagnostic`], a value a
//! type handler cannot coerce is dropped from the condition tree.
//!
//! [`QueryError`] exists for callers who want a `Result`: converting a failed
//! [`crate::ValidationResult`], or loading configuration from JSON.
//!
//! ## Logging
//!
//! Diagnostics are emitted through `tracing`. The crate never installs a subscriber;
//! to see them, set one up in the host application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt()
//!     .with_target(false)
//!     .compact()
//!     .init();
//! ```

use serde::Serialize;
use std::fmt;

/// A parameter that could not be decoded and was left out of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    /// Parameter name as it appeared in the query string (e.g. `filters`)
    pub parameter: String,
    /// Decoder message
    pub message: String,
}

impl ParseDiagnostic {
    #[must_use]
    pub fn new(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid JSON in '{}': {}", self.parameter, self.message)
    }
}

#[derive(Debug)]
pub enum QueryError {
    /// The request violated the configured specification
    ValidationFailed {
        /// Every error reported by the validator, in order
        errors: Vec<String>,
    },

    /// A specification or transform configuration could not be loaded
    InvalidConfig {
        message: String,
        source: Option<serde_json::Error>,
    },
}

impl QueryError {
    #[must_use]
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    pub fn invalid_config(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidConfig {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Errors to report back to the client. Empty for configuration failures, which
    /// are the host application's problem.
    #[must_use]
    pub fn user_messages(&self) -> &[String] {
        match self {
            Self::ValidationFailed { errors } => errors,
            Self::InvalidConfig { .. } => &[],
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed { errors } if errors.len() == 1 => f.write_str(&errors[0]),
            Self::ValidationFailed { errors } => {
                write!(f, "Validation failed: {}", errors.join(", "))
            }
            Self::InvalidConfig {
                message,
                source: Some(source),
            } => write!(f, "{message}: {source}"),
            Self::InvalidConfig { message, .. } => f.write_str(message),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig {
                source: Some(source),
                ..
            } => Some(source),
            _ => None,
        }
    }
}
