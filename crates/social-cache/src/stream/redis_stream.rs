//! Redis Streams state change source.
//!
//! One stream per entity kind (`{prefix}:{kind}`), read through a consumer
//! group. The stream entry id is both the message id and the ack id.

use std::marker::PhantomData;

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::streams::{StreamId, StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use social_common::StreamConfig;
use social_core::{Acker, Consumer, DomainError, Entity, Producer, ServiceResult, StateChange};

use crate::pool::{RedisPool, RedisPoolError, RedisResult};

/// Stream entry field holding the JSON encoded change
pub const PAYLOAD_FIELD: &str = "payload";

/// Read position for the next `consume` call
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    /// Replaying this consumer's unacknowledged entries after the given id
    Pending(String),
    /// Reading entries never delivered to the group
    Live,
}

/// State change source backed by a Redis stream and consumer group.
///
/// On start a consumer first replays the entries it was handed before but
/// never acknowledged, then switches to new entries. A `consume` dropped
/// mid-read leaves its entry pending for that replay.
pub struct RedisStreamSource<E> {
    pool: RedisPool,
    key: String,
    group: String,
    consumer: String,
    block_ms: usize,
    cursor: Mutex<Cursor>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> std::fmt::Debug for RedisStreamSource<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStreamSource")
            .field("key", &self.key)
            .field("group", &self.group)
            .field("consumer", &self.consumer)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> RedisStreamSource<E> {
    /// Create a source for the entity kind `E`. Call `ensure_group` before
    /// consuming.
    pub fn new(pool: RedisPool, config: &StreamConfig) -> Self {
        Self {
            pool,
            key: config.key(E::KIND),
            group: config.group.clone(),
            consumer: config.consumer.clone(),
            block_ms: usize::try_from(config.block_ms).unwrap_or(usize::MAX),
            cursor: Mutex::new(Cursor::Pending("0".to_string())),
            _entity: PhantomData,
        }
    }

    /// Stream key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Create the stream and consumer group if they do not exist yet
    pub async fn ensure_group(&self) -> RedisResult<()> {
        let mut conn = self.pool.get().await?;
        let created: redis::RedisResult<()> = conn
            .xgroup_create_mkstream(&self.key, &self.group, "0")
            .await;

        match created {
            Ok(()) => {
                tracing::info!(stream = %self.key, group = %self.group, "Created consumer group");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(RedisPoolError::Redis(e)),
        }
    }

    /// Read at most one entry at the current cursor
    async fn read_one(&self, cursor: &Cursor) -> RedisResult<Option<StreamId>> {
        let mut conn = self.pool.get().await?;

        let mut opts = StreamReadOptions::default()
            .group(&self.group, &self.consumer)
            .count(1);
        let from = match cursor {
            Cursor::Pending(after) => after.as_str(),
            Cursor::Live => {
                opts = opts.block(self.block_ms);
                ">"
            }
        };

        let reply: Option<StreamReadReply> = conn.xread_options(&[&self.key], &[from], &opts).await?;

        Ok(reply
            .and_then(|r| r.keys.into_iter().next())
            .and_then(|k| k.ids.into_iter().next()))
    }

    fn decode(&self, entry: &StreamId) -> ServiceResult<StateChange<E>> {
        let payload: String = entry.get(PAYLOAD_FIELD).ok_or_else(|| {
            DomainError::transport(format!("entry {} on {} has no payload", entry.id, self.key))
        })?;

        let mut change: StateChange<E> = serde_json::from_str(&payload)
            .map_err(|e| DomainError::transport(format!("undecodable entry {}: {e}", entry.id)))?;
        change.id.clone_from(&entry.id);
        Ok(change.with_ack_id(entry.id.clone()))
    }

    /// Decode a delivered entry. An entry that cannot be decoded is logged
    /// and acknowledged so it does not stay pending forever.
    async fn accept(&self, entry: &StreamId) -> ServiceResult<Option<StateChange<E>>> {
        match self.decode(entry) {
            Ok(change) => Ok(Some(change)),
            Err(e) => {
                tracing::error!(
                    stream = %self.key,
                    group = %self.group,
                    entry_id = %entry.id,
                    error = %e,
                    "Discarding undecodable stream entry"
                );
                self.ack(&entry.id).await?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl<E: Entity> Producer<E> for RedisStreamSource<E> {
    async fn propagate(&self, namespace: &str, old: Option<&E>, new: &E) -> ServiceResult<String> {
        // The stream assigns the id
        let change = StateChange::new(String::new(), namespace, old.cloned(), new.clone());
        let payload = serde_json::to_string(&change).map_err(RedisPoolError::from)?;

        let mut conn = self.pool.get().await?;
        let id: String = conn
            .xadd(&self.key, "*", &[(PAYLOAD_FIELD, payload)])
            .await
            .map_err(RedisPoolError::from)?;

        tracing::debug!(stream = %self.key, namespace, message_id = %id, "Appended state change");
        Ok(id)
    }
}

#[async_trait]
impl<E: Entity> Consumer<E> for RedisStreamSource<E> {
    async fn consume(&self) -> ServiceResult<StateChange<E>> {
        loop {
            let cursor = self.cursor.lock().clone();
            let entry = self.read_one(&cursor).await?;

            match (cursor, entry) {
                (Cursor::Pending(_), None) => {
                    tracing::debug!(stream = %self.key, consumer = %self.consumer, "Pending entries replayed");
                    *self.cursor.lock() = Cursor::Live;
                }
                (Cursor::Pending(_), Some(entry)) => {
                    *self.cursor.lock() = Cursor::Pending(entry.id.clone());
                    if let Some(change) = self.accept(&entry).await? {
                        return Ok(change);
                    }
                }
                // Block timed out
                (Cursor::Live, None) => {}
                (Cursor::Live, Some(entry)) => {
                    if let Some(change) = self.accept(&entry).await? {
                        return Ok(change);
                    }
                }
            }
        }
    }
}

#[async_trait]
impl<E: Entity> Acker for RedisStreamSource<E> {
    async fn ack(&self, ack_id: &str) -> ServiceResult<()> {
        let mut conn = self.pool.get().await?;
        let acked: i64 = conn
            .xack(&self.key, &self.group, &[ack_id])
            .await
            .map_err(RedisPoolError::from)?;

        if acked == 0 {
            return Err(DomainError::transport(format!("unknown ack id: {ack_id}")));
        }
        Ok(())
    }
}
