//! Flake IDs - 64-bit, roughly time-ordered unique identifiers
//!
//! Structure:
//! - Bits 63-22: Timestamp (milliseconds since custom epoch)
//! - Bits 21-12: Worker ID (0-1023)
//! - Bits 11-0:  Sequence number (0-4095)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::error::DomainError;
use crate::traits::IdGenerator;

/// Custom epoch: 2024-01-01 00:00:00 UTC (milliseconds)
const EPOCH: u64 = 1_704_067_200_000;
const SEQUENCE_MASK: u64 = 0xFFF;

/// Highest accepted worker id
pub const MAX_WORKER_ID: u16 = 1023;

/// Derive the ID-sequence name for an entity kind within a tenant namespace.
///
/// `flake_namespace("acme", "reactions") == "acme_reactions"`
pub fn flake_namespace(namespace: &str, kind: &str) -> String {
    format!("{namespace}_{kind}")
}

#[derive(Debug, Default)]
struct SequenceState {
    last_timestamp: u64,
    sequence: u64,
}

/// A single monotonic ID sequence
///
/// Generates up to 4096 IDs per millisecond. When the sequence is exhausted or
/// the wall clock steps backwards, the logical timestamp keeps advancing from
/// the last issued one instead of waiting.
#[derive(Debug)]
pub struct FlakeGenerator {
    worker_id: u16,
    state: Mutex<SequenceState>,
}

impl FlakeGenerator {
    /// Create a new generator with the given worker ID
    pub fn new(worker_id: u16) -> Result<Self, DomainError> {
        if worker_id > MAX_WORKER_ID {
            return Err(DomainError::generator(format!(
                "worker id must be <= {MAX_WORKER_ID}, got {worker_id}"
            )));
        }

        Ok(Self {
            worker_id,
            state: Mutex::new(SequenceState::default()),
        })
    }

    /// Generate the next ID
    pub fn generate(&self) -> u64 {
        let mut state = self.state.lock();
        let now = current_timestamp().max(state.last_timestamp);

        if now == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // Sequence overflow, borrow the next millisecond
                state.last_timestamp += 1;
            }
        } else {
            state.last_timestamp = now;
            state.sequence = 0;
        }

        (state.last_timestamp.saturating_sub(EPOCH) << 22)
            | (u64::from(self.worker_id) << 12)
            | state.sequence
    }

    /// Get the worker ID of this generator
    pub fn worker_id(&self) -> u16 {
        self.worker_id
    }
}

/// Extract the worker ID from a flake
#[inline]
pub fn worker_id_of(id: u64) -> u16 {
    ((id >> 12) & 0x3FF) as u16
}

/// [`IdGenerator`] keeping one [`FlakeGenerator`] per flake namespace
#[derive(Debug)]
pub struct FlakeIdGenerator {
    worker_id: u16,
    sequences: Mutex<HashMap<String, Arc<FlakeGenerator>>>,
}

impl FlakeIdGenerator {
    pub fn new(worker_id: u16) -> Result<Self, DomainError> {
        // Reject a bad worker id up front rather than on first use
        FlakeGenerator::new(worker_id)?;

        Ok(Self {
            worker_id,
            sequences: Mutex::new(HashMap::new()),
        })
    }

    fn sequence(&self, namespace: &str) -> Result<Arc<FlakeGenerator>, DomainError> {
        let mut sequences = self.sequences.lock();
        if let Some(generator) = sequences.get(namespace) {
            return Ok(Arc::clone(generator));
        }

        let generator = Arc::new(FlakeGenerator::new(self.worker_id)?);
        sequences.insert(namespace.to_string(), Arc::clone(&generator));
        Ok(generator)
    }
}

impl IdGenerator for FlakeIdGenerator {
    fn next_id(&self, namespace: &str) -> Result<u64, DomainError> {
        Ok(self.sequence(namespace)?.generate())
    }
}

#[inline]
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
