//! Traits (ports) - the contracts every backend and transport implements
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

mod entity;
mod id_generator;
mod service;
mod source;

pub use entity::{Entity, QueryOptions, Searchable};
pub use id_generator::IdGenerator;
pub use service::{Lifecycle, ReactionService, Service, ServiceResult, UserService};
pub use source::{Acker, Consumer, Producer, Source};
