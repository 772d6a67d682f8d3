//! Application error types
//!
//! Unified error handling for binaries and adapters built on the services.

use std::fmt;

use social_core::DomainError;

use crate::config::ConfigError;
use crate::telemetry::TracingError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Redis errors
    #[error("Cache error: {0}")]
    Cache(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    // Telemetry errors
    #[error(transparent)]
    Telemetry(#[from] TracingError),
}

impl AppError {
    /// Get error code for logs and responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Cache(_) => "CACHE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Telemetry(_) => "TELEMETRY_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Whether retrying the same operation could succeed.
    ///
    /// Transport and cache failures are transient; validation, missing
    /// entities and configuration mistakes are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Cache(_) => true,
            Self::Domain(e) => e.is_transport(),
            Self::Internal(_) | Self::Config(_) | Self::Telemetry(_) => false,
        }
    }

    /// Create a cache error
    #[must_use]
    pub fn cache(msg: impl fmt::Display) -> Self {
        Self::Cache(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
