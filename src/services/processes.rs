//! Running process discovery

use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;

/// Source of running process names
pub trait ProcessSource {
    fn running_process_names(&mut self) -> Vec<String>;
}

/// Lists processes of the host through `sysinfo`
pub struct SystemProcesses {
    system: System,
}

impl SystemProcesses {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemProcesses {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for SystemProcesses {
    fn running_process_names(&mut self) -> Vec<String> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);

        let mut names: Vec<String> = self
            .system
            .processes()
            .values()
            .map(|process| process.name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names.dedup();

        debug!("Found {} distinct running processes", names.len());
        names
    }
}

/// Fixed process list, for hosts where enumeration is not wanted
impl ProcessSource for Vec<String> {
    fn running_process_names(&mut self) -> Vec<String> {
        self.clone()
    }
}
