//! # social-service
//!
//! Application layer containing the in-memory entity services, middleware,
//! and the service context that wires them together.

pub mod middleware;
pub mod services;

pub use middleware::{chain, reaction_logging, source_logging, user_logging, Logged, Middleware};
pub use services::{MemService, ServiceContext, ServiceContextBuilder};
