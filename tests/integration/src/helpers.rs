//! Test harness helpers
//!
//! Wires the services to in-memory sources so tests can observe every
//! state change a write produces.

use std::sync::Arc;

use anyhow::Result;
use social_cache::MemorySource;
use social_core::{FlakeIdGenerator, Reaction, User};
use social_service::{ServiceContext, ServiceContextBuilder};

/// Worker id used by every harness
pub const TEST_WORKER_ID: u16 = 7;

/// Service context plus the sources its services publish to
pub struct TestHarness {
    pub ctx: ServiceContext,
    pub reaction_source: MemorySource<Reaction>,
    pub user_source: MemorySource<User>,
}

impl TestHarness {
    /// Harness without middleware
    pub fn new() -> Result<Self> {
        Self::build(false)
    }

    /// Harness with logging middleware on every service
    pub fn with_logging() -> Result<Self> {
        Self::build(true)
    }

    fn build(logging: bool) -> Result<Self> {
        let reaction_source = MemorySource::new();
        let user_source = MemorySource::new();

        let mut builder = ServiceContextBuilder::new()
            .id_generator(Arc::new(FlakeIdGenerator::new(TEST_WORKER_ID)?))
            .reaction_source(Arc::new(reaction_source.clone()))
            .user_source(Arc::new(user_source.clone()));
        if logging {
            builder = builder.with_logging();
        }

        Ok(Self {
            ctx: builder.build()?,
            reaction_source,
            user_source,
        })
    }
}

/// Redis URL for tests that need a live server.
///
/// Returns `None` (and the test should return early) when `REDIS_URL` is unset.
pub fn redis_url() -> Option<String> {
    let _ = dotenvy::dotenv();

    match std::env::var("REDIS_URL") {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping: REDIS_URL not set");
            None
        }
    }
}
