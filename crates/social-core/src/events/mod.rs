//! Domain events - change notifications emitted after every write

mod state_change;

pub use state_change::StateChange;
