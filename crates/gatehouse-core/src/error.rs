//! Error types for Gatehouse.
//!
//! [`GatehouseError`] covers both load-time failures (`Config`) and
//! stage-local failures inside the pipeline. Stage errors never propagate
//! past the executor - it converts them into a rejecting
//! [`Decision`](crate::Decision) - but handlers and the rule layer use this
//! type for their `Result`s.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`GatehouseError`].
pub type GatehouseResult<T> = Result<T, GatehouseError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad rule or handler configuration, rejected at load time.
    Config,
    /// Authentication failed (invalid credentials).
    Authentication,
    /// Authorization denied.
    Authorization,
    /// Request mutation failed.
    Mutation,
    /// A handler exceeded its deadline.
    Timeout,
    /// Internal errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Config => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::Mutation => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for Gatehouse.
///
/// # Example
///
/// ```
/// use gatehouse_core::{ErrorCategory, GatehouseError};
///
/// fn check_id(id: &str) -> Result<(), GatehouseError> {
///     if id.is_empty() {
///         return Err(GatehouseError::config("rule id must not be empty"));
///     }
///     Ok(())
/// }
///
/// assert_eq!(check_id("").unwrap_err().category(), ErrorCategory::Config);
/// ```
#[derive(Error, Debug)]
pub enum GatehouseError {
    /// Invalid rule or handler configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Authorization denied.
    #[error("Authorization denied: {message}")]
    Authorization {
        /// Human-readable error message.
        message: String,
    },

    /// Request mutation failed.
    #[error("Mutation error: {message}")]
    Mutation {
        /// Human-readable error message.
        message: String,
    },

    /// A handler exceeded its deadline.
    #[error("Timeout: {message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// Internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to callers).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl GatehouseError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Creates a mutation error.
    #[must_use]
    pub fn mutation(message: impl Into<String>) -> Self {
        Self::Mutation {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Config { .. } => ErrorCategory::Config,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::Mutation { .. } => ErrorCategory::Mutation,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }
}
