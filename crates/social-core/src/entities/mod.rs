//! Domain entities - core business objects

mod reaction;
mod user;

pub use reaction::{Reaction, ReactionListExt};
pub use user::{User, UserListExt};
