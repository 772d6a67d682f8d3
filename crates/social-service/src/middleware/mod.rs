//! Middleware - decorators adding cross-cutting behavior to services and sources
//!
//! A middleware takes a service (or source) and returns one with the same
//! contract. `chain` applies them in order, so the last one is outermost.

mod logging;

use std::sync::Arc;

use social_core::{Entity, ReactionService, Source, UserService};

pub use logging::Logged;

/// Wraps a service or source behind the same trait object
pub type Middleware<S> = Box<dyn Fn(Arc<S>) -> Arc<S> + Send + Sync>;

/// Apply `middlewares` to `inner`, first to last
pub fn chain<S: ?Sized>(
    inner: Arc<S>,
    middlewares: impl IntoIterator<Item = Middleware<S>>,
) -> Arc<S> {
    middlewares.into_iter().fold(inner, |wrapped, middleware| middleware(wrapped))
}

/// Log every reaction service call
pub fn reaction_logging() -> Middleware<dyn ReactionService> {
    Box::new(|inner: Arc<dyn ReactionService>| -> Arc<dyn ReactionService> {
        Arc::new(Logged::new("reactions", inner))
    })
}

/// Log every user service call
pub fn user_logging() -> Middleware<dyn UserService> {
    Box::new(|inner: Arc<dyn UserService>| -> Arc<dyn UserService> {
        Arc::new(Logged::new("users", inner))
    })
}

/// Log every produce, consume and ack on a state change source
pub fn source_logging<E: Entity>() -> Middleware<dyn Source<E>> {
    Box::new(|inner: Arc<dyn Source<E>>| -> Arc<dyn Source<E>> {
        Arc::new(Logged::new(E::KIND, inner))
    })
}
