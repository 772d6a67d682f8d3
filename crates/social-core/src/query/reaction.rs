//! Reaction query options

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Reaction;
use crate::traits::QueryOptions;
use crate::value_objects::ReactionType;

use super::{flag_matches, in_set};

/// Options to narrow down reaction queries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionQuery {
    /// Only reactions last updated strictly before this instant
    #[serde(skip)]
    pub before: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(skip)]
    pub ids: Vec<u64>,
    #[serde(skip)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub object_ids: Vec<u64>,
    #[serde(default)]
    pub owner_ids: Vec<u64>,
    #[serde(default)]
    pub types: Vec<ReactionType>,
}

impl ReactionQuery {
    /// Reactions on the given objects that are not deleted
    pub fn active_on(object_ids: impl Into<Vec<u64>>) -> Self {
        Self {
            deleted: Some(false),
            object_ids: object_ids.into(),
            ..Self::default()
        }
    }

    /// Whether `reaction` satisfies every populated option
    pub fn matches(&self, reaction: &Reaction) -> bool {
        if let Some(before) = self.before {
            match reaction.updated_at {
                Some(at) if at < before => {}
                _ => return false,
            }
        }

        flag_matches(self.deleted, reaction.deleted)
            && in_set(&self.ids, &reaction.id)
            && in_set(&self.object_ids, &reaction.object_id)
            && in_set(&self.owner_ids, &reaction.owner_id)
            && in_set(&self.types, &reaction.kind)
    }
}

impl QueryOptions for ReactionQuery {
    fn limit(&self) -> Option<usize> {
        self.limit.filter(|l| *l > 0)
    }
}
