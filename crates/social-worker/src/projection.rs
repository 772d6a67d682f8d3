//! Reaction counts projection
//!
//! Folds reaction state changes into per-object counts of live reactions.
//! Applying the same change twice, or an older version after a newer one,
//! leaves the counts unchanged.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use social_core::{Counts, CountsMap, Reaction, ReactionType, StateChange};

type ReactionKey = (String, u64);

/// What one reaction currently adds to the counts
#[derive(Debug, Clone, Copy)]
struct Applied {
    updated_at: Option<DateTime<Utc>>,
    contribution: Option<(u64, ReactionType)>,
}

#[derive(Debug, Default)]
struct State {
    applied: HashMap<ReactionKey, Applied>,
    counts: HashMap<String, CountsMap>,
}

/// Live reaction counts per namespace and object
#[derive(Debug, Default)]
pub struct CountsProjection {
    state: Mutex<State>,
}

impl CountsProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one change. Returns false when it was already reflected.
    pub fn apply(&self, change: &StateChange<Reaction>) -> bool {
        let reaction = &change.new;
        let key = (change.namespace.clone(), reaction.id);
        let mut state = self.state.lock();

        if let Some(previous) = state.applied.get(&key) {
            if previous.updated_at >= reaction.updated_at {
                return false;
            }
        }

        let contribution = (!reaction.deleted).then_some((reaction.object_id, reaction.kind));
        let previous = state.applied.insert(
            key,
            Applied {
                updated_at: reaction.updated_at,
                contribution,
            },
        );

        let counts = state.counts.entry(change.namespace.clone()).or_default();
        if let Some((object_id, kind)) = previous.and_then(|p| p.contribution) {
            if let Some(object) = counts.get_mut(&object_id) {
                object.decrement(kind);
                if object.is_empty() {
                    counts.remove(&object_id);
                }
            }
        }
        if let Some((object_id, kind)) = contribution {
            counts.entry(object_id).or_default().increment(kind);
        }

        true
    }

    /// Counts of one object
    pub fn get(&self, namespace: &str, object_id: u64) -> Counts {
        self.state
            .lock()
            .counts
            .get(namespace)
            .and_then(|objects| objects.get(&object_id))
            .copied()
            .unwrap_or_default()
    }

    /// Counts of every object with at least one live reaction
    pub fn namespace(&self, namespace: &str) -> CountsMap {
        self.state
            .lock()
            .counts
            .get(namespace)
            .cloned()
            .unwrap_or_default()
    }
}
