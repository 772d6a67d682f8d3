//! Service implementations and the dependency container

mod context;
mod mem;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use mem::MemService;
