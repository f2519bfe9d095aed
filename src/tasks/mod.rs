//! Tasks module
//! 
//! The countdown run and the lifecycle-hook runs the binary can perform.

pub mod countdown;
pub mod lifecycle;

// Re-export main types
pub use countdown::{CountdownController, Outcome};
pub use lifecycle::{log_event, record_lifecycle, LifecycleHook};
