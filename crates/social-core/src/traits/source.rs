//! Change-notification ports

use async_trait::async_trait;

use crate::events::StateChange;

use super::entity::Entity;
use super::service::ServiceResult;

/// Publishes state changes
#[async_trait]
pub trait Producer<E: Entity>: Send + Sync {
    /// Publish the before/after pair of one mutation.
    ///
    /// Returns the transport's publish handle, which is not the ack id seen
    /// by consumers.
    async fn propagate(&self, namespace: &str, old: Option<&E>, new: &E) -> ServiceResult<String>;
}

/// Observes state changes
#[async_trait]
pub trait Consumer<E: Entity>: Send + Sync {
    /// Wait for the next state change.
    ///
    /// Dropping the returned future must not lose a message that was already
    /// taken off the transport.
    async fn consume(&self) -> ServiceResult<StateChange<E>>;
}

/// Confirms processing of a delivered state change
#[async_trait]
pub trait Acker: Send + Sync {
    async fn ack(&self, ack_id: &str) -> ServiceResult<()>;
}

/// Full change-notification transport
pub trait Source<E: Entity>: Producer<E> + Consumer<E> + Acker {}

impl<E: Entity, T> Source<E> for T where T: Producer<E> + Consumer<E> + Acker {}
