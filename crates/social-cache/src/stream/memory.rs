//! In-process state change source.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use social_core::{Acker, Consumer, DomainError, Entity, Producer, ServiceResult, StateChange};
use tokio::sync::Notify;
use uuid::Uuid;

/// A change with its publish order, used to restore order on redelivery
type Sequenced<E> = (u64, StateChange<E>);

struct Queue<E> {
    next_seq: u64,
    ready: VecDeque<Sequenced<E>>,
    in_flight: HashMap<String, Sequenced<E>>,
    closed: bool,
}

struct Shared<E> {
    queue: Mutex<Queue<E>>,
    notify: Notify,
}

/// Unbounded FIFO source shared by any number of producers and consumers.
///
/// Every delivery gets a fresh ack id. Delivered but unacknowledged changes
/// are kept until acknowledged or handed back with `requeue_unacked`.
pub struct MemorySource<E> {
    shared: Arc<Shared<E>>,
}

impl<E> Clone for MemorySource<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E> std::fmt::Debug for MemorySource<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.shared.queue.lock();
        f.debug_struct("MemorySource")
            .field("pending", &queue.ready.len())
            .field("in_flight", &queue.in_flight.len())
            .field("closed", &queue.closed)
            .finish()
    }
}

impl<E> Default for MemorySource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> MemorySource<E> {
    /// Create an empty, open source
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(Queue {
                    next_seq: 0,
                    ready: VecDeque::new(),
                    in_flight: HashMap::new(),
                    closed: false,
                }),
                notify: Notify::new(),
            }),
        }
    }

    /// Changes waiting for a consumer
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().ready.len()
    }

    /// Changes delivered but not yet acknowledged
    pub fn in_flight(&self) -> usize {
        self.shared.queue.lock().in_flight.len()
    }

    /// Stop accepting changes. Consumers drain what is queued, then fail.
    pub fn close(&self) {
        self.shared.queue.lock().closed = true;
        self.shared.notify.notify_waiters();
    }

    /// Put every unacknowledged change back at the head of the queue, in
    /// publish order. Their old ack ids become invalid.
    pub fn requeue_unacked(&self) -> usize {
        let mut queue = self.shared.queue.lock();

        let mut unacked: Vec<Sequenced<E>> = queue.in_flight.drain().map(|(_, v)| v).collect();
        unacked.sort_by_key(|(seq, _)| *seq);
        let count = unacked.len();

        for entry in unacked.into_iter().rev() {
            queue.ready.push_front(entry);
        }
        drop(queue);

        for _ in 0..count {
            self.shared.notify.notify_one();
        }

        tracing::debug!(count, "Requeued unacknowledged changes");
        count
    }

    fn enqueue(&self, change: StateChange<E>) -> ServiceResult<()> {
        let mut queue = self.shared.queue.lock();
        if queue.closed {
            return Err(DomainError::transport("source closed"));
        }

        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.ready.push_back((seq, change));
        drop(queue);

        self.shared.notify.notify_one();
        Ok(())
    }
}

impl<E: Clone> MemorySource<E> {
    /// Take the next ready change, if any, and register it as in flight
    fn try_take(&self) -> Option<ServiceResult<StateChange<E>>> {
        let mut queue = self.shared.queue.lock();

        if let Some((seq, change)) = queue.ready.pop_front() {
            let ack_id = Uuid::new_v4().to_string();
            queue.in_flight.insert(ack_id.clone(), (seq, change.clone()));
            return Some(Ok(change.with_ack_id(ack_id)));
        }

        if queue.closed {
            return Some(Err(DomainError::transport("source closed")));
        }

        None
    }
}

#[async_trait]
impl<E: Entity> Producer<E> for MemorySource<E> {
    async fn propagate(&self, namespace: &str, old: Option<&E>, new: &E) -> ServiceResult<String> {
        let id = Uuid::new_v4().to_string();
        self.enqueue(StateChange::new(id.clone(), namespace, old.cloned(), new.clone()))?;

        tracing::trace!(kind = E::KIND, namespace, message_id = %id, "Queued state change");
        Ok(id)
    }
}

#[async_trait]
impl<E: Entity> Consumer<E> for MemorySource<E> {
    async fn consume(&self) -> ServiceResult<StateChange<E>> {
        loop {
            // Register interest before looking, so a publish in between is not missed
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(result) = self.try_take() {
                return result;
            }

            notified.await;
        }
    }
}

#[async_trait]
impl<E: Send + Sync> Acker for MemorySource<E> {
    async fn ack(&self, ack_id: &str) -> ServiceResult<()> {
        match self.shared.queue.lock().in_flight.remove(ack_id) {
            Some(_) => Ok(()),
            None => Err(DomainError::transport(format!("unknown ack id: {ack_id}"))),
        }
    }
}
