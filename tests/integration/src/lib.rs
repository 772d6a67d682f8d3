//! Integration test utilities for the social services
//!
//! This crate provides helpers for running end-to-end tests against the
//! in-memory services, the state change sources and the worker.

pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
