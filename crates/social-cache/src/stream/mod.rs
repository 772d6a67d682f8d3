//! State change sources.
//!
//! Each source implements the `Producer`, `Consumer` and `Acker` ports for
//! one entity kind. Delivery is at-least-once: a change stays owed to the
//! consumers until it is acknowledged.

mod memory;
mod redis_stream;

pub use memory::MemorySource;
pub use redis_stream::{RedisStreamSource, PAYLOAD_FIELD};
