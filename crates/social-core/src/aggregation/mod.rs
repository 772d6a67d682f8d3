//! Aggregation - per-object reaction tallies

mod counts;

pub use counts::{counts_by_object, Counts, CountsMap};
