//! In-memory entity service
//!
//! One bucket per namespace, keyed by entity id. Every write is validated,
//! stored, then propagated as a state change.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use social_core::{
    counts_by_object, filter_list, flake_namespace, search_rank, sort_by_recency, CountsMap,
    DomainError, Entity, IdGenerator, Lifecycle, Producer, QueryOptions, Reaction, ReactionQuery,
    ReactionService, Searchable, Service, ServiceResult, User, UserQuery, UserService,
};
use tracing::{debug, instrument, warn};

type Bucket<E> = Arc<RwLock<HashMap<u64, E>>>;

/// Map-backed implementation of the entity service contract.
///
/// Buckets are created lazily by every operation. Reads work on a snapshot
/// taken under the bucket's read lock; the check-exists, assign-id, write
/// sequence of `put` runs under its write lock. No lock is held while a
/// change is propagated.
pub struct MemService<E: Entity> {
    buckets: DashMap<String, Bucket<E>>,
    ids: Arc<dyn IdGenerator>,
    producer: Arc<dyn Producer<E>>,
}

impl<E: Entity> std::fmt::Debug for MemService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemService")
            .field("kind", &E::KIND)
            .field("namespaces", &self.buckets.len())
            .finish_non_exhaustive()
    }
}

impl<E: Entity> MemService<E> {
    /// Create a service drawing ids from `ids` and publishing every write to `producer`
    pub fn new(ids: Arc<dyn IdGenerator>, producer: Arc<dyn Producer<E>>) -> Self {
        Self {
            buckets: DashMap::new(),
            ids,
            producer,
        }
    }

    /// Get the bucket for a namespace, creating it if absent
    fn bucket(&self, namespace: &str) -> Bucket<E> {
        if let Some(bucket) = self.buckets.get(namespace) {
            return Arc::clone(&bucket);
        }
        Arc::clone(&self.buckets.entry(namespace.to_string()).or_default())
    }

    /// Matching entities, cloned out of the bucket
    fn snapshot(&self, namespace: &str, opts: &E::Query) -> Vec<E> {
        let bucket = self.bucket(namespace);
        let entities = bucket.read();
        filter_list(entities.values(), opts)
    }

    /// Insert or update under the bucket's write lock.
    ///
    /// Returns the previous version (if any) and the stored one.
    fn store(&self, namespace: &str, bucket: &Bucket<E>, mut entity: E) -> ServiceResult<(Option<E>, E)> {
        let now = Utc::now();
        let mut entities = bucket.write();

        let old = if entity.id() == 0 {
            let id = self.ids.next_id(&flake_namespace(namespace, E::FLAKE_KIND))?;
            entity.set_id(id);
            if entity.created_at().is_none() {
                entity.set_created_at(now);
            }
            None
        } else {
            let existing = entities
                .get(&entity.id())
                .ok_or_else(|| DomainError::not_found(E::KIND, entity.id()))?;
            if let Some(created_at) = existing.created_at() {
                entity.set_created_at(created_at);
            }
            Some(existing.clone())
        };

        entity.set_updated_at(now);
        entities.insert(entity.id(), entity.clone());

        Ok((old, entity))
    }

    /// Hand a stored mutation to the producer. The write is kept on failure.
    async fn propagate(&self, namespace: &str, old: Option<&E>, new: &E) -> ServiceResult<()> {
        match self.producer.propagate(namespace, old, new).await {
            Ok(message_id) => {
                debug!(kind = E::KIND, namespace, id = new.id(), %message_id, "State change propagated");
                Ok(())
            }
            Err(e) => {
                warn!(
                    kind = E::KIND,
                    namespace,
                    id = new.id(),
                    error = %e,
                    "Write stored but state change not propagated"
                );
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<E: Entity> Lifecycle for MemService<E> {
    async fn setup(&self, namespace: &str) -> ServiceResult<()> {
        self.bucket(namespace);
        Ok(())
    }

    async fn teardown(&self, namespace: &str) -> ServiceResult<()> {
        if self.buckets.remove(namespace).is_some() {
            debug!(kind = E::KIND, namespace, "Namespace torn down");
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> Service<E> for MemService<E> {
    #[instrument(skip(self, entity), fields(kind = E::KIND, id = entity.id()))]
    async fn put(&self, namespace: &str, entity: E) -> ServiceResult<E> {
        let bucket = self.bucket(namespace);
        entity.validate()?;

        let (old, new) = self.store(namespace, &bucket, entity)?;
        self.propagate(namespace, old.as_ref(), &new).await?;

        Ok(new)
    }

    async fn query(&self, namespace: &str, opts: &E::Query) -> ServiceResult<Vec<E>> {
        let mut entities = self.snapshot(namespace, opts);
        sort_by_recency(&mut entities);

        if let Some(limit) = opts.limit() {
            entities.truncate(limit);
        }

        Ok(entities)
    }

    async fn count(&self, namespace: &str, opts: &E::Query) -> ServiceResult<usize> {
        let bucket = self.bucket(namespace);
        let entities = bucket.read();
        Ok(entities.values().filter(|e| e.matches(opts)).count())
    }
}

#[async_trait]
impl ReactionService for MemService<Reaction> {
    async fn count_multi(&self, namespace: &str, opts: &ReactionQuery) -> ServiceResult<CountsMap> {
        let bucket = self.bucket(namespace);
        let reactions = bucket.read();
        Ok(counts_by_object(reactions.values().filter(|r| r.matches(opts))))
    }
}

#[async_trait]
impl UserService for MemService<User> {
    #[instrument(skip(self, opts), fields(query = %opts.query, offset = opts.offset))]
    async fn search(&self, namespace: &str, opts: &UserQuery) -> ServiceResult<Vec<User>> {
        if opts.query.is_empty() {
            return Err(DomainError::invalid_query("search text is empty"));
        }

        // Recency order first so that equal ranks stay deterministic
        let mut ranked = self.snapshot(namespace, opts);
        sort_by_recency(&mut ranked);
        ranked.sort_by_cached_key(|u| search_rank(&opts.query, u.search_text()));

        paginate(ranked, opts.offset, opts.limit.unwrap_or(0))
    }

    #[instrument(skip(self))]
    async fn put_last_read(
        &self,
        namespace: &str,
        user_id: u64,
        last_read: DateTime<Utc>,
    ) -> ServiceResult<()> {
        let bucket = self.bucket(namespace);

        let change = {
            let mut users = bucket.write();
            users.get_mut(&user_id).map(|user| {
                let old = user.clone();
                user.last_read = Some(last_read);
                (old, user.clone())
            })
        };

        match change {
            Some((old, new)) => self.propagate(namespace, Some(&old), &new).await,
            None => Ok(()),
        }
    }
}

/// Slice `[offset, offset + limit)` out of a ranked list.
///
/// An offset past the end yields nothing; zero offset and limit yield
/// everything; a window reaching past the end is rejected.
fn paginate<T>(ranked: Vec<T>, offset: usize, limit: usize) -> ServiceResult<Vec<T>> {
    let total = ranked.len();

    if offset > total {
        return Ok(Vec::new());
    }
    if offset == 0 && limit == 0 {
        return Ok(ranked);
    }

    let end = offset
        .checked_add(limit)
        .filter(|end| *end <= total)
        .ok_or_else(|| {
            DomainError::invalid_query(format!(
                "page of {limit} at offset {offset} exceeds {total} results"
            ))
        })?;

    Ok(ranked.into_iter().skip(offset).take(end - offset).collect())
}
