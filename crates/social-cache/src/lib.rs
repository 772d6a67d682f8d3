//! # social-cache
//!
//! Transport layer for state change notifications.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Memory Source**: In-process queue with acknowledgement and redelivery
//! - **Redis Stream Source**: Consumer-group backed stream shared across processes
//!
//! ## Example
//!
//! ```ignore
//! use social_cache::{MemorySource, RedisPool, RedisStreamSource};
//!
//! let source = Arc::new(MemorySource::<Reaction>::new());
//! source.propagate("acme", None, &reaction).await?;
//!
//! let change = source.consume().await?;
//! source.ack(&change.ack_id).await?;
//! ```

pub mod pool;
pub mod stream;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export stream types
pub use stream::{MemorySource, RedisStreamSource, PAYLOAD_FIELD};
