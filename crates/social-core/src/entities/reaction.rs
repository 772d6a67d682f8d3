//! Reaction entity - an interaction (like, love, ...) on an object

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::query::ReactionQuery;
use crate::traits::Entity;
use crate::value_objects::ReactionType;

/// Reaction entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(default)]
    pub id: u64,
    pub object_id: u64,
    pub owner_id: u64,
    #[serde(rename = "type")]
    pub kind: ReactionType,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Reaction {
    /// Create an unsaved Reaction
    pub fn new(object_id: u64, owner_id: u64, kind: ReactionType) -> Self {
        Self {
            id: 0,
            object_id,
            owner_id,
            kind,
            deleted: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Soft delete: flag the reaction, keep the record
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

impl Entity for Reaction {
    type Query = ReactionQuery;

    const KIND: &'static str = "reaction";
    const FLAKE_KIND: &'static str = "reactions";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = Some(at);
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.object_id == 0 {
            return Err(DomainError::invalid_entity(Self::KIND, "missing object id"));
        }

        if self.owner_id == 0 {
            return Err(DomainError::invalid_entity(Self::KIND, "missing owner id"));
        }

        // The type is range-checked where raw ordinals enter (TryFrom<u8>, serde)
        Ok(())
    }

    fn matches(&self, opts: &ReactionQuery) -> bool {
        opts.matches(self)
    }
}

/// Helpers on reaction collections
pub trait ReactionListExt {
    /// Owner ids in collection order
    fn owner_ids(&self) -> Vec<u64>;
}

impl ReactionListExt for [Reaction] {
    fn owner_ids(&self) -> Vec<u64> {
        self.iter().map(|r| r.owner_id).collect()
    }
}
