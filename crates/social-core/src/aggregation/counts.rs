//! Reaction counts per object

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::Reaction;
use crate::value_objects::ReactionType;

/// Tally of reactions on one object, one counter per reaction type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub angry: u64,
    pub haha: u64,
    pub like: u64,
    pub love: u64,
    pub sad: u64,
    pub wow: u64,
}

/// Object id to its counts
pub type CountsMap = HashMap<u64, Counts>;

impl Counts {
    fn slot(&mut self, kind: ReactionType) -> &mut u64 {
        match kind {
            ReactionType::Like => &mut self.like,
            ReactionType::Love => &mut self.love,
            ReactionType::Haha => &mut self.haha,
            ReactionType::Wow => &mut self.wow,
            ReactionType::Sad => &mut self.sad,
            ReactionType::Angry => &mut self.angry,
        }
    }

    /// Count one more reaction of `kind`
    pub fn increment(&mut self, kind: ReactionType) {
        *self.slot(kind) += 1;
    }

    /// Count one less reaction of `kind`, saturating at zero
    pub fn decrement(&mut self, kind: ReactionType) {
        let slot = self.slot(kind);
        *slot = slot.saturating_sub(1);
    }

    pub fn get(&self, kind: ReactionType) -> u64 {
        match kind {
            ReactionType::Like => self.like,
            ReactionType::Love => self.love,
            ReactionType::Haha => self.haha,
            ReactionType::Wow => self.wow,
            ReactionType::Sad => self.sad,
            ReactionType::Angry => self.angry,
        }
    }

    /// Sum over all types
    pub fn total(&self) -> u64 {
        ReactionType::ALL.iter().map(|k| self.get(*k)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Tally reactions by object.
///
/// Callers filter beforehand; every reaction given is counted, deleted or not.
pub fn counts_by_object<'a, I>(reactions: I) -> CountsMap
where
    I: IntoIterator<Item = &'a Reaction>,
{
    let mut map = CountsMap::new();
    for reaction in reactions {
        map.entry(reaction.object_id)
            .or_default()
            .increment(reaction.kind);
    }
    map
}
