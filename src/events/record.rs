//! Transition records written to the event log

use std::{fmt, time::Duration};

use chrono::{DateTime, Local};

use crate::state::ExitMode;

/// Column header of the event log
pub const HEADER: &str =
    "Timestamp;Event;Mode;ElapsedSeconds;RemainingSeconds;KeyPressed;Success;Processes";

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    TimerStarted,
    AutoSwitch,
    ShutdownBlocked,
    KeyPressed,
    ProgramEnded,
    Interrupted,
    ComputerStarted,
    ComputerShutDown,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::TimerStarted => "TimerStarted",
            EventKind::AutoSwitch => "AutoSwitch",
            EventKind::ShutdownBlocked => "ShutdownBlocked",
            EventKind::KeyPressed => "KeyPressed",
            EventKind::ProgramEnded => "ProgramEnded",
            EventKind::Interrupted => "Interrupted",
            EventKind::ComputerStarted => "ComputerStarted",
            EventKind::ComputerShutDown => "ComputerShutDown",
        };
        f.write_str(name)
    }
}

/// One immutable row of the event log
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRecord {
    pub timestamp: DateTime<Local>,
    pub kind: EventKind,
    pub mode: ExitMode,
    pub elapsed: Duration,
    pub remaining: Duration,
    pub key: Option<&'static str>,
    pub success: bool,
    pub processes: Vec<String>,
}

impl TransitionRecord {
    /// Create a successful record stamped with the current local time
    pub fn new(kind: EventKind, mode: ExitMode, elapsed: Duration, remaining: Duration) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
            mode,
            elapsed,
            remaining,
            key: None,
            success: true,
            processes: Vec::new(),
        }
    }

    /// Record outside of any countdown
    pub fn lifecycle(kind: EventKind) -> Self {
        Self::new(kind, ExitMode::None, Duration::ZERO, Duration::ZERO)
    }

    pub fn with_key(mut self, label: &'static str) -> Self {
        self.key = Some(label);
        self
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    pub fn with_processes(mut self, processes: Vec<String>) -> Self {
        self.processes = processes;
        self
    }

    /// Format as a semicolon-delimited log row (without newline)
    pub fn to_row(&self) -> String {
        format!(
            "{};{};{};{:.3};{:.3};{};{};{}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S:%3f"),
            self.kind,
            self.mode,
            self.elapsed.as_secs_f64(),
            self.remaining.as_secs_f64(),
            self.key.unwrap_or("None"),
            if self.success { "True" } else { "False" },
            self.processes.join(","),
        )
    }
}
