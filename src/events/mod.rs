//! Event log module
//! 
//! Transition records and the append-only file they are written to.

pub mod record;
pub mod sink;

// Re-export main types
pub use record::{EventKind, TransitionRecord, HEADER};
pub use sink::EventSink;
