//! Sleep Countdown - a console countdown that powers the machine down
//! 
//! After a short timeout the machine is suspended, shut down or rebooted
//! unless the user cancels. Key presses switch between the actions, and
//! during night hours the default is upgraded to a shutdown.

pub mod config;
pub mod state;
pub mod events;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::{Cli, CountdownConfig, EscalationPolicy};
pub use state::ExitMode;
pub use tasks::{CountdownController, Outcome};
