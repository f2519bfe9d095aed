//! Countdown stopwatch

use std::time::Duration;
use tokio::time::Instant;

/// Elapsed-time counter paired with a fixed timeout
#[derive(Debug, Clone)]
pub struct Stopwatch {
    timeout: Duration,
    started: Instant,
}

impl Stopwatch {
    /// Start a new stopwatch now
    pub fn start(timeout: Duration) -> Self {
        Self {
            timeout,
            started: Instant::now(),
        }
    }

    /// Reset elapsed time to zero, keeping the timeout
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the timeout, zero once expired
    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    /// Completed share of the timeout as a whole percentage in `0..=100`
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.elapsed(), self.timeout)
    }
}

/// Whole percentage of `timeout` covered by `elapsed`, clamped to `0..=100`
pub fn progress_percent(elapsed: Duration, timeout: Duration) -> u8 {
    if timeout.is_zero() {
        return 100;
    }
    let ratio = elapsed.as_secs_f64() / timeout.as_secs_f64();
    (ratio * 100.0).clamp(0.0, 100.0) as u8
}
