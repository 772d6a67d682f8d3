//! State change - before/after snapshot of a single entity mutation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything a downstream consumer needs to observe one mutation.
///
/// `old == None` denotes a creation. `new` is always present: deletes are
/// updates with the deleted flag set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange<E> {
    /// Transport acknowledgment handle, set on delivery
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ack_id: String,
    /// Transport message id
    pub id: String,
    pub namespace: String,
    pub new: E,
    pub old: Option<E>,
    pub sent_at: DateTime<Utc>,
}

impl<E> StateChange<E> {
    /// Create an undelivered state change stamped with the current time
    pub fn new(id: impl Into<String>, namespace: impl Into<String>, old: Option<E>, new: E) -> Self {
        Self {
            ack_id: String::new(),
            id: id.into(),
            namespace: namespace.into(),
            new,
            old,
            sent_at: Utc::now(),
        }
    }

    /// Attach the ack handle of a delivery
    pub fn with_ack_id(mut self, ack_id: impl Into<String>) -> Self {
        self.ack_id = ack_id.into();
        self
    }

    /// Whether this change created the entity
    #[inline]
    pub fn is_creation(&self) -> bool {
        self.old.is_none()
    }
}
