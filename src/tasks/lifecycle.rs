//! Startup/shutdown hook runs and best-effort event logging

use tracing::{info, warn};

use crate::{
    events::{EventKind, EventSink, TransitionRecord},
    utils::Console,
};

/// Append a record, reporting failures on the console instead of propagating
pub fn log_event(sink: &EventSink, console: &mut Console, record: TransitionRecord) {
    if let Err(e) = sink.append(&record) {
        warn!("Failed to write {} record to {}: {}", record.kind, sink.path().display(), e);
        console.error(&format!("Failed to write to the log: {}", e));
    }
}

/// Which hook the program was launched from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleHook {
    Startup,
    Shutdown,
}

impl LifecycleHook {
    pub fn event(&self) -> EventKind {
        match self {
            LifecycleHook::Startup => EventKind::ComputerStarted,
            LifecycleHook::Shutdown => EventKind::ComputerShutDown,
        }
    }
}

/// Record a machine lifecycle event without counting down
pub fn record_lifecycle(sink: &EventSink, console: &mut Console, hook: LifecycleHook) {
    info!("Recording lifecycle hook {:?}", hook);
    log_event(sink, console, TransitionRecord::lifecycle(hook.event()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io};

    #[test]
    fn hook_writes_single_record() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let sink = EventSink::new(dir.path().join("log.csv"));
        let mut console = Console::new(io::sink());

        record_lifecycle(&sink, &mut console, LifecycleHook::Shutdown);

        let contents = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains(";ComputerShutDown;None;"));
    }

    #[test]
    fn logging_failure_is_swallowed() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let sink = EventSink::new(dir.path());
        let mut console = Console::new(io::sink());

        record_lifecycle(&sink, &mut console, LifecycleHook::Startup);
    }
}
