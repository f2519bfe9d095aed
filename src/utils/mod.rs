//! Utility functions module
//! 
//! Console output, terminal mode handling and signal handling.

pub mod console;
pub mod signals;
pub mod terminal;

// Re-export main types
pub use console::Console;
pub use signals::shutdown_signal;
pub use terminal::TerminalGuard;
