//! # social-worker
//!
//! Consumes reaction state changes and keeps per-object reaction counts.

pub mod projection;
pub mod worker;

use std::future::Future;
use std::sync::Arc;

use social_cache::{RedisPool, RedisStreamSource};
use social_common::{AppConfig, AppError, AppResult};
use social_core::{Reaction, Source};
use social_service::{chain, source_logging};

pub use projection::CountsProjection;
pub use worker::Worker;

/// Run the worker against the configured Redis stream until `shutdown` resolves
pub async fn run(config: AppConfig, shutdown: impl Future<Output = ()>) -> AppResult<()> {
    let pool = RedisPool::from_config(&config.redis).map_err(AppError::cache)?;
    pool.health_check().await.map_err(AppError::cache)?;

    let stream = RedisStreamSource::<Reaction>::new(pool, &config.stream);
    stream.ensure_group().await.map_err(AppError::cache)?;

    let source: Arc<dyn Source<Reaction>> = chain(
        Arc::new(stream) as Arc<dyn Source<Reaction>>,
        [source_logging::<Reaction>()],
    );

    let worker = Worker::new(source, Arc::new(CountsProjection::new()));
    worker.run(shutdown).await;

    Ok(())
}
