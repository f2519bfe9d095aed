//! System power operations: suspend, power off and reboot

use std::process::Stdio;

use tracing::info;

use crate::state::ExitMode;

/// Arguments of a suspend request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuspendRequest {
    pub hibernate: bool,
    pub force: bool,
    pub wake_events_disabled: bool,
}

/// Sleep, not hibernate, forced, with wake events disabled
pub const SUSPEND_REQUEST: SuspendRequest = SuspendRequest {
    hibernate: false,
    force: true,
    wake_events_disabled: true,
};

#[cfg(windows)]
const POWER_OFF: (&str, &[&str]) = ("shutdown", &["/s", "/t", "0"]);
#[cfg(windows)]
const REBOOT: (&str, &[&str]) = ("shutdown", &["/r", "/t", "0"]);

#[cfg(not(windows))]
const POWER_OFF: (&str, &[&str]) = ("shutdown", &["-h", "now"]);
#[cfg(not(windows))]
const REBOOT: (&str, &[&str]) = ("shutdown", &["-r", "now"]);

/// Power action decided by the countdown, executed once all output is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Suspend,
    PowerOff,
    Reboot,
}

impl PendingAction {
    /// Action matching a final exit mode; `Cancel` has none
    pub fn for_mode(mode: ExitMode) -> Option<Self> {
        match mode {
            ExitMode::Sleep => Some(PendingAction::Suspend),
            ExitMode::ShutDown => Some(PendingAction::PowerOff),
            ExitMode::Reboot => Some(PendingAction::Reboot),
            ExitMode::Cancel | ExitMode::None => None,
        }
    }

    /// Message printed once the action has been decided
    pub fn activated_message(&self) -> &'static str {
        match self {
            PendingAction::Suspend => "Sleep mode activated.",
            PendingAction::PowerOff => "Shutdown activated.",
            PendingAction::Reboot => "Reboot activated.",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            PendingAction::Suspend => "Sleep",
            PendingAction::PowerOff => "Shutdown",
            PendingAction::Reboot => "Reboot",
        }
    }

    /// Run the action against the operating system
    pub async fn execute(&self) -> Result<(), String> {
        match self {
            PendingAction::Suspend => execute_system_suspend(SUSPEND_REQUEST).await,
            PendingAction::PowerOff => spawn_detached(POWER_OFF),
            PendingAction::Reboot => spawn_detached(REBOOT),
        }
    }
}

/// Execute system suspension through `systemctl`, waiting for the request to be accepted.
///
/// Only `hibernate` maps onto systemd; forcing and wake events are left to its policy.
#[cfg(not(windows))]
pub async fn execute_system_suspend(request: SuspendRequest) -> Result<(), String> {
    use tokio::process::Command;
    use tracing::warn;

    info!("Executing system suspension ({:?})", request);

    let output = Command::new("systemctl")
        .arg(if request.hibernate { "hibernate" } else { "suspend" })
        .output()
        .await
        .map_err(|e| format!("Failed to execute systemctl: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("systemctl exited with {}", output.status);
        return Err(format!("systemctl failed: {}", stderr.trim()));
    }

    info!("System suspension command executed");
    Ok(())
}

/// Execute system suspension through `SetSuspendState`, which returns once the machine wakes.
#[cfg(windows)]
pub async fn execute_system_suspend(request: SuspendRequest) -> Result<(), String> {
    use windows_sys::Win32::System::Power::SetSuspendState;

    info!("Executing system suspension ({:?})", request);

    let result = tokio::task::spawn_blocking(move || {
        // SAFETY: SetSuspendState takes three flags by value and touches no caller memory.
        let accepted = unsafe {
            SetSuspendState(
                u8::from(request.hibernate),
                u8::from(request.force),
                u8::from(request.wake_events_disabled),
            )
        };
        if accepted != 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    })
    .await
    .map_err(|e| format!("Suspend task failed: {}", e))?;

    result.map_err(|e| format!("SetSuspendState failed: {}", e))?;
    info!("System suspension completed");
    Ok(())
}

/// Launch a shutdown command without waiting for it
fn spawn_detached((program, args): (&str, &[&str])) -> Result<(), String> {
    info!("Launching {} {}", program, args.join(" "));

    std::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| format!("Failed to execute {}: {}", program, e))
}
