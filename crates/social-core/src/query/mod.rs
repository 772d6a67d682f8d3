//! Query model and filter evaluator
//!
//! Every populated option narrows the result (logical AND); values inside one
//! option are alternatives (logical OR). An empty option never constrains.

mod distance;
mod reaction;
mod user;

use std::cmp::Reverse;

pub use distance::{edit_distance, search_rank};
pub use reaction::ReactionQuery;
pub use user::UserQuery;

use crate::traits::Entity;

/// Clone every entity matching `opts`
pub fn filter_list<'a, E, I>(entities: I, opts: &E::Query) -> Vec<E>
where
    E: Entity,
    I: IntoIterator<Item = &'a E>,
{
    entities
        .into_iter()
        .filter(|e| e.matches(opts))
        .cloned()
        .collect()
}

/// Most recently updated first; equal timestamps fall back to the higher id
pub fn sort_by_recency<E: Entity>(entities: &mut [E]) {
    entities.sort_by_key(|e| Reverse((e.updated_at(), e.id())));
}

/// Membership test where an empty set means "no constraint"
#[inline]
pub(crate) fn in_set<T: PartialEq>(set: &[T], value: &T) -> bool {
    set.is_empty() || set.contains(value)
}

/// Equality test where `None` means "no constraint"
#[inline]
pub(crate) fn flag_matches(expected: Option<bool>, actual: bool) -> bool {
    expected.map_or(true, |e| e == actual)
}
