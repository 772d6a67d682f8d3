//! Entity service traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::aggregation::CountsMap;
use crate::entities::{Reaction, User};
use crate::error::DomainError;
use crate::query::{ReactionQuery, UserQuery};

use super::entity::Entity;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, DomainError>;

// ============================================================================
// Lifecycle
// ============================================================================

/// Tenant bucket management
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Create the namespace bucket if absent. Idempotent.
    async fn setup(&self, namespace: &str) -> ServiceResult<()>;

    /// Remove the namespace bucket and everything in it. Idempotent.
    async fn teardown(&self, namespace: &str) -> ServiceResult<()>;
}

// ============================================================================
// Generic Service
// ============================================================================

#[async_trait]
pub trait Service<E: Entity>: Lifecycle {
    /// Create (`id == 0`) or update an entity and propagate the change
    async fn put(&self, namespace: &str, entity: E) -> ServiceResult<E>;

    /// Matching entities, most recently updated first
    async fn query(&self, namespace: &str, opts: &E::Query) -> ServiceResult<Vec<E>>;

    /// Number of matching entities
    async fn count(&self, namespace: &str, opts: &E::Query) -> ServiceResult<usize>;
}

// ============================================================================
// Reaction Service
// ============================================================================

#[async_trait]
pub trait ReactionService: Service<Reaction> {
    /// Matching reactions tallied by type per object
    async fn count_multi(&self, namespace: &str, opts: &ReactionQuery) -> ServiceResult<CountsMap>;
}

// ============================================================================
// User Service
// ============================================================================

#[async_trait]
pub trait UserService: Service<User> {
    /// Users ranked by username edit distance to `opts.query`
    async fn search(&self, namespace: &str, opts: &UserQuery) -> ServiceResult<Vec<User>>;

    /// Record when a user last read their feed
    async fn put_last_read(
        &self,
        namespace: &str,
        user_id: u64,
        last_read: DateTime<Utc>,
    ) -> ServiceResult<()>;
}
