//! Exit mode enumeration

use std::fmt;

/// The terminal action currently selected by the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitMode {
    /// Pre-loop sentinel, never valid once the countdown finishes
    #[default]
    None,
    Cancel,
    Sleep,
    ShutDown,
    Reboot,
}

impl ExitMode {
    /// Label used in the event log and console output
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitMode::None => "None",
            ExitMode::Cancel => "Cancel",
            ExitMode::Sleep => "Sleep",
            ExitMode::ShutDown => "ShutDown",
            ExitMode::Reboot => "Reboot",
        }
    }

    /// Whether this mode ends in a power action
    pub fn is_power_action(&self) -> bool {
        matches!(self, ExitMode::Sleep | ExitMode::ShutDown | ExitMode::Reboot)
    }
}

impl fmt::Display for ExitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
