//! Logging middleware

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use social_core::{
    Acker, Consumer, CountsMap, Entity, Lifecycle, Producer, ReactionQuery, ReactionService,
    Service, ServiceResult, StateChange, User, UserQuery, UserService,
};
use tracing::{debug, warn};

/// Logs operation, namespace, latency and error code of every call, then
/// delegates unchanged.
pub struct Logged<S: ?Sized> {
    component: &'static str,
    inner: Arc<S>,
}

impl<S: ?Sized> Logged<S> {
    pub fn new(component: &'static str, inner: Arc<S>) -> Self {
        Self { component, inner }
    }

    fn record<T>(&self, op: &'static str, namespace: &str, started: Instant, result: &ServiceResult<T>) {
        let elapsed_us = started.elapsed().as_micros() as u64;

        match result {
            Ok(_) => debug!(component = self.component, op, namespace, elapsed_us, "call succeeded"),
            Err(e) => warn!(
                component = self.component,
                op,
                namespace,
                elapsed_us,
                code = e.code(),
                error = %e,
                "call failed"
            ),
        }
    }
}

#[async_trait]
impl<S: Lifecycle + ?Sized> Lifecycle for Logged<S> {
    async fn setup(&self, namespace: &str) -> ServiceResult<()> {
        let started = Instant::now();
        let result = self.inner.setup(namespace).await;
        self.record("setup", namespace, started, &result);
        result
    }

    async fn teardown(&self, namespace: &str) -> ServiceResult<()> {
        let started = Instant::now();
        let result = self.inner.teardown(namespace).await;
        self.record("teardown", namespace, started, &result);
        result
    }
}

#[async_trait]
impl<E: Entity, S: Service<E> + ?Sized> Service<E> for Logged<S> {
    async fn put(&self, namespace: &str, entity: E) -> ServiceResult<E> {
        let started = Instant::now();
        let result = self.inner.put(namespace, entity).await;
        self.record("put", namespace, started, &result);
        result
    }

    async fn query(&self, namespace: &str, opts: &E::Query) -> ServiceResult<Vec<E>> {
        let started = Instant::now();
        let result = self.inner.query(namespace, opts).await;
        self.record("query", namespace, started, &result);
        result
    }

    async fn count(&self, namespace: &str, opts: &E::Query) -> ServiceResult<usize> {
        let started = Instant::now();
        let result = self.inner.count(namespace, opts).await;
        self.record("count", namespace, started, &result);
        result
    }
}

#[async_trait]
impl<S: ReactionService + ?Sized> ReactionService for Logged<S> {
    async fn count_multi(&self, namespace: &str, opts: &ReactionQuery) -> ServiceResult<CountsMap> {
        let started = Instant::now();
        let result = self.inner.count_multi(namespace, opts).await;
        self.record("count_multi", namespace, started, &result);
        result
    }
}

#[async_trait]
impl<S: UserService + ?Sized> UserService for Logged<S> {
    async fn search(&self, namespace: &str, opts: &UserQuery) -> ServiceResult<Vec<User>> {
        let started = Instant::now();
        let result = self.inner.search(namespace, opts).await;
        self.record("search", namespace, started, &result);
        result
    }

    async fn put_last_read(
        &self,
        namespace: &str,
        user_id: u64,
        last_read: DateTime<Utc>,
    ) -> ServiceResult<()> {
        let started = Instant::now();
        let result = self.inner.put_last_read(namespace, user_id, last_read).await;
        self.record("put_last_read", namespace, started, &result);
        result
    }
}

#[async_trait]
impl<E: Entity, S: Producer<E> + ?Sized> Producer<E> for Logged<S> {
    async fn propagate(&self, namespace: &str, old: Option<&E>, new: &E) -> ServiceResult<String> {
        let started = Instant::now();
        let result = self.inner.propagate(namespace, old, new).await;
        self.record("propagate", namespace, started, &result);
        result
    }
}

#[async_trait]
impl<E: Entity, S: Consumer<E> + ?Sized> Consumer<E> for Logged<S> {
    async fn consume(&self) -> ServiceResult<StateChange<E>> {
        let started = Instant::now();
        let result = self.inner.consume().await;
        let namespace = result.as_ref().map_or("", |change| change.namespace.as_str());
        self.record("consume", namespace, started, &result);
        result
    }
}

#[async_trait]
impl<S: Acker + ?Sized> Acker for Logged<S> {
    async fn ack(&self, ack_id: &str) -> ServiceResult<()> {
        let started = Instant::now();
        let result = self.inner.ack(ack_id).await;
        self.record("ack", "", started, &result);
        result
    }
}
