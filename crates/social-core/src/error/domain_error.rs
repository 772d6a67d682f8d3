//! Domain errors - error kinds shared by every entity service and source

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("invalid {kind}: {message}")]
    InvalidEntity { kind: &'static str, message: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u64 },

    // =========================================================================
    // Collaborator Errors (wrapped)
    // =========================================================================
    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("id generator failure: {0}")]
    GeneratorFailure(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a validation error for the given entity kind
    pub fn invalid_entity(kind: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidEntity {
            kind,
            message: message.into(),
        }
    }

    /// Create a query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    /// Create a not found error
    pub fn not_found(kind: &'static str, id: u64) -> Self {
        Self::NotFound { kind, id }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure(message.into())
    }

    /// Create a generator error
    pub fn generator(message: impl Into<String>) -> Self {
        Self::GeneratorFailure(message.into())
    }

    /// Get an error code string for logs and outward responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEntity { .. } => "INVALID_ENTITY",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::TransportFailure(_) => "TRANSPORT_FAILURE",
            Self::GeneratorFailure(_) => "GENERATOR_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidEntity { .. } | Self::InvalidQuery(_))
    }

    /// Check if the error originated in the change transport
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportFailure(_))
    }
}
