//! # social-core
//!
//! Domain layer containing entities, the query model, aggregation, service
//! traits, and change events. This crate has no dependency on any transport
//! or storage backend.

pub mod aggregation;
pub mod entities;
pub mod error;
pub mod events;
pub mod query;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use aggregation::{counts_by_object, Counts, CountsMap};
pub use entities::{Reaction, ReactionListExt, User, UserListExt};
pub use error::DomainError;
pub use events::StateChange;
pub use query::{
    edit_distance, filter_list, search_rank, sort_by_recency, ReactionQuery, UserQuery,
};
pub use traits::{
    Acker, Consumer, Entity, IdGenerator, Lifecycle, Producer, QueryOptions, ReactionService,
    Searchable, Service, ServiceResult, Source, UserService,
};
pub use value_objects::{
    flake_namespace, worker_id_of, FlakeGenerator, FlakeIdGenerator, ReactionType, MAX_WORKER_ID,
};
