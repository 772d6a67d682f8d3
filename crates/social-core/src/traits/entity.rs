//! Entity capability shared by every stored type

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::DomainError;

/// Behaviour a type needs to be stored by a generic entity service.
///
/// Each entity owns its validation and its match predicate; backends only
/// orchestrate ID assignment, timestamps and storage.
pub trait Entity:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Filter options understood by [`Entity::matches`]
    type Query: QueryOptions;

    /// Singular name used in errors and logs
    const KIND: &'static str;

    /// Plural name used to derive the ID sequence per tenant
    const FLAKE_KIND: &'static str;

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);

    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn set_created_at(&mut self, at: DateTime<Utc>);

    fn updated_at(&self) -> Option<DateTime<Utc>>;
    fn set_updated_at(&mut self, at: DateTime<Utc>);

    /// Check semantic correctness before a write
    fn validate(&self) -> Result<(), DomainError>;

    /// Filter evaluator: true when the entity satisfies every populated option
    fn matches(&self, opts: &Self::Query) -> bool;
}

/// Options common to every query type
pub trait QueryOptions: fmt::Debug + Default + Send + Sync {
    /// Maximum number of results, `None` for no limit
    fn limit(&self) -> Option<usize>;
}

/// Entities ranked by free-text search
pub trait Searchable: Entity {
    /// Text compared against the search query
    fn search_text(&self) -> &str;
}
