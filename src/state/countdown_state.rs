//! Countdown state machine: exit mode, auto-switch flag and transition rules

use std::time::Duration;

use super::{ExitMode, Stopwatch};
use crate::services::keys::{Key, KeyState};

/// A mode change caused by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub key: Key,
    /// Mode active before the key press
    pub from: ExitMode,
    pub to: ExitMode,
    /// Elapsed time on the stopwatch before it was restarted
    pub elapsed: Duration,
}

/// Result of evaluating one poll tick
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub transitions: Vec<Transition>,
    pub cancelled: bool,
}

/// Mutable state owned by a single countdown run
#[derive(Debug, Clone)]
pub struct CountdownState {
    mode: ExitMode,
    auto_switch: bool,
    stopwatch: Stopwatch,
}

impl CountdownState {
    /// Start a countdown in `Sleep` mode
    pub fn new(timeout: Duration) -> Self {
        Self {
            mode: ExitMode::Sleep,
            auto_switch: false,
            stopwatch: Stopwatch::start(timeout),
        }
    }

    pub fn mode(&self) -> ExitMode {
        self.mode
    }

    pub fn auto_switch(&self) -> bool {
        self.auto_switch
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    /// Force the pending action up to `ShutDown` at entry
    pub fn escalate(&mut self) {
        self.stopwatch.restart();
        self.mode = ExitMode::ShutDown;
        self.auto_switch = true;
    }

    /// Apply the per-tick key rules in order: cancel, reboot toggle, primary toggle.
    ///
    /// `sample` is only called for keys whose rule can still fire, so the
    /// reboot key is left unread while the mode is already `Reboot`.
    pub fn tick<F>(&mut self, mut sample: F) -> TickOutcome
    where
        F: FnMut(Key) -> KeyState,
    {
        let mut outcome = TickOutcome::default();

        if sample(Key::Cancel).is_active() {
            outcome.transitions.push(Transition {
                key: Key::Cancel,
                from: self.mode,
                to: ExitMode::Cancel,
                elapsed: self.stopwatch.elapsed(),
            });
            self.mode = ExitMode::Cancel;
            outcome.cancelled = true;
            return outcome;
        }

        if self.mode != ExitMode::Reboot && sample(Key::ToggleReboot).is_active() {
            outcome.transitions.push(self.switch(Key::ToggleReboot, ExitMode::Reboot));
        }

        if sample(Key::TogglePrimary) == KeyState::Held {
            if let Some(target) = self.primary_target() {
                outcome.transitions.push(self.switch(Key::TogglePrimary, target));
            }
        }

        outcome
    }

    /// Where the primary toggle leads from the current mode, if anywhere
    fn primary_target(&self) -> Option<ExitMode> {
        if self.auto_switch {
            (self.mode == ExitMode::ShutDown).then_some(ExitMode::Sleep)
        } else {
            (self.mode != ExitMode::ShutDown).then_some(ExitMode::ShutDown)
        }
    }

    fn switch(&mut self, key: Key, to: ExitMode) -> Transition {
        let transition = Transition {
            key,
            from: self.mode,
            to,
            elapsed: self.stopwatch.elapsed(),
        };
        self.stopwatch.restart();
        self.mode = to;
        transition
    }
}
