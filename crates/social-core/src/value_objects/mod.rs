//! Value objects - immutable types that represent domain concepts

mod flake;
mod reaction_type;

pub use flake::{flake_namespace, worker_id_of, FlakeGenerator, FlakeIdGenerator, MAX_WORKER_ID};
pub use reaction_type::ReactionType;
