//! ID generator port

use crate::error::DomainError;

/// Source of unique entity IDs, one sequence per flake namespace.
///
/// See [`crate::value_objects::flake_namespace`] for how sequence names are
/// derived. A failure here aborts the write that asked for the ID.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, namespace: &str) -> Result<u64, DomainError>;
}
