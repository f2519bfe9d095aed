//! State management module
//! 
//! This module contains the countdown state machine and its building blocks.

pub mod exit_mode;
pub mod timer_state;
pub mod countdown_state;

// Re-export main types
pub use exit_mode::ExitMode;
pub use timer_state::Stopwatch;
pub use countdown_state::{CountdownState, TickOutcome, Transition};
