//! Local wall-clock access

use chrono::{Local, NaiveTime};

/// Source of the local time of day
pub trait LocalClock {
    fn time_of_day(&self) -> NaiveTime;
}

/// Reads the host's local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl LocalClock for SystemClock {
    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}
