//! External collaborators module
//! 
//! This module contains the operating-system facing pieces the countdown
//! depends on: keyboard, clock, process list and power actions.

pub mod clock;
pub mod keys;
pub mod power;
pub mod processes;

// Re-export main types
pub use clock::{LocalClock, SystemClock};
pub use keys::{Key, KeySampler, KeyState, TerminalKeySampler};
pub use power::PendingAction;
pub use processes::{ProcessSource, SystemProcesses};
