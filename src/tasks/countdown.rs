//! Countdown controller: the poll loop that picks and dispatches a power action

use std::time::Duration;

use tracing::{debug, info};

use super::lifecycle::log_event;
use crate::{
    config::CountdownConfig,
    events::{EventKind, EventSink, TransitionRecord},
    services::{Key, KeySampler, LocalClock, PendingAction, ProcessSource},
    state::{CountdownState, ExitMode, Transition},
    utils::Console,
};

/// How a countdown run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub mode: ExitMode,
    pub auto_switch: bool,
    /// Action the caller must execute once all output is written
    pub action: Option<PendingAction>,
}

/// Drives one countdown run
pub struct CountdownController<K, P, C> {
    config: CountdownConfig,
    keys: K,
    processes: P,
    clock: C,
    sink: EventSink,
    console: Console,
}

impl<K, P, C> CountdownController<K, P, C>
where
    K: KeySampler,
    P: ProcessSource,
    C: LocalClock,
{
    pub fn new(
        config: CountdownConfig,
        keys: K,
        processes: P,
        clock: C,
        sink: EventSink,
        console: Console,
    ) -> Self {
        Self {
            config,
            keys,
            processes,
            clock,
            sink,
            console,
        }
    }

    /// Give back the console once the run is over
    pub fn into_console(self) -> Console {
        self.console
    }

    /// Count down, then return the decided outcome without executing it
    pub async fn run(&mut self) -> Outcome {
        let state = self.enter();
        self.count_down(state).await
    }

    /// Announce the countdown, start the timer and apply auto-escalation
    pub fn enter(&mut self) -> CountdownState {
        let timeout = self.config.timeout;
        self.console.line(&format!(
            "The computer will go to sleep in {} seconds.",
            timeout.as_secs_f64()
        ));
        self.console.line("Press ESC to cancel, Enter to switch mode or + to reboot.");
        self.console.blank();

        let mut state = CountdownState::new(timeout);
        self.console.info("Countdown started.");
        self.emit(self.record(EventKind::TimerStarted, &state));

        self.apply_escalation(&mut state);
        state
    }

    /// Poll keys until the timeout expires or the run is cancelled, then dispatch
    pub async fn count_down(&mut self, mut state: CountdownState) -> Outcome {
        while !state.stopwatch().is_expired() {
            let watch = state.stopwatch();
            self.console.progress(state.mode(), watch.elapsed(), watch.timeout());

            let keys = &mut self.keys;
            let tick = state.tick(|key| keys.sample(key));
            for transition in &tick.transitions {
                self.report(transition);
            }
            if tick.cancelled {
                break;
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }

        if state.mode().is_power_action() {
            let watch = state.stopwatch();
            self.console.progress(state.mode(), watch.elapsed(), watch.timeout());
            self.console.finish_progress();
        }

        self.dispatch(&state)
    }

    fn apply_escalation(&mut self, state: &mut CountdownState) {
        let now = self.clock.time_of_day();
        if !self.config.escalation.in_window(now) {
            debug!("{} is outside the escalation window", now);
            return;
        }

        let running = self.processes.running_process_names();
        let blocking: Vec<String> = self
            .config
            .escalation
            .blocking(&running)
            .into_iter()
            .map(str::to_string)
            .collect();

        if blocking.is_empty() {
            info!("Escalating to shutdown at {}", now);
            self.console.info("Night hours: switching to shutdown automatically.");
            self.emit(self.record(EventKind::AutoSwitch, state));
            state.escalate();
        } else {
            info!("Escalation blocked by {:?}", blocking);
            self.console.error(&format!(
                "Blocking processes are running: {}",
                blocking.join(", ")
            ));
            let record = TransitionRecord::new(
                EventKind::ShutdownBlocked,
                ExitMode::ShutDown,
                Duration::ZERO,
                self.config.timeout,
            )
            .with_success(false)
            .with_processes(blocking);
            self.emit(record);
        }
    }

    fn report(&mut self, transition: &Transition) {
        let label = transition.key.label();
        let message = match (transition.key, transition.to) {
            (Key::Cancel, _) => format!("{} pressed. Countdown cancelled.", label),
            (_, ExitMode::Reboot) => format!("{} pressed. Reboot.", label),
            (_, ExitMode::Sleep) => format!("{} pressed. Sleep mode.", label),
            (_, ExitMode::ShutDown) => format!("{} pressed. Shutdown.", label),
            (_, mode) => format!("{} pressed. {}.", label, mode),
        };
        info!("{:?} -> {:?} via {}", transition.from, transition.to, label);
        self.console.info(&message);

        let record = TransitionRecord::new(
            EventKind::KeyPressed,
            transition.from,
            transition.elapsed,
            self.config.timeout.saturating_sub(transition.elapsed),
        )
        .with_key(label);
        self.emit(record);
    }

    fn dispatch(&mut self, state: &CountdownState) -> Outcome {
        let mode = state.mode();
        if mode == ExitMode::None {
            unreachable!("countdown finished without an exit mode");
        }

        // Every mode but Cancel maps to an action.
        let action = PendingAction::for_mode(mode);
        match action {
            Some(action) => self.console.success(action.activated_message()),
            None => self.console.info("Cancelled by user."),
        }

        info!("Countdown finished in {} mode", mode);
        self.emit(self.record(EventKind::ProgramEnded, state));

        Outcome {
            mode,
            auto_switch: state.auto_switch(),
            action,
        }
    }

    fn record(&self, kind: EventKind, state: &CountdownState) -> TransitionRecord {
        let watch = state.stopwatch();
        TransitionRecord::new(kind, state.mode(), watch.elapsed(), watch.remaining())
    }

    fn emit(&mut self, record: TransitionRecord) {
        log_event(&self.sink, &mut self.console, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::KeyState;
    use chrono::NaiveTime;
    use std::{fs, io};

    struct NoKeys(usize);

    impl KeySampler for NoKeys {
        fn sample(&mut self, _key: Key) -> KeyState {
            self.0 += 1;
            KeyState::Idle
        }
    }

    struct FixedClock(NaiveTime);

    impl LocalClock for FixedClock {
        fn time_of_day(&self) -> NaiveTime {
            self.0
        }
    }

    fn controller(
        dir: &tempfile::TempDir,
        time: (u32, u32),
        running: &[&str],
    ) -> CountdownController<NoKeys, Vec<String>, FixedClock> {
        let config = CountdownConfig {
            log_path: dir.path().join("log.csv"),
            ..CountdownConfig::default()
        };
        let sink = EventSink::new(&config.log_path);
        CountdownController::new(
            config,
            NoKeys(0),
            running.iter().map(|s| s.to_string()).collect(),
            FixedClock(NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap()),
            sink,
            Console::new(io::sink()),
        )
    }

    fn log_lines(dir: &tempfile::TempDir) -> Vec<String> {
        fs::read_to_string(dir.path().join("log.csv"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn entry_in_window_escalates_before_any_key_is_sampled() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let mut controller = controller(&dir, (3, 15), &["bash", "sshd"]);

        let state = controller.enter();
        assert_eq!(state.mode(), ExitMode::ShutDown);
        assert!(state.auto_switch());
        assert_eq!(state.stopwatch().elapsed(), Duration::ZERO);
        assert_eq!(controller.keys.0, 0);

        let lines = log_lines(&dir);
        assert!(lines[0].contains(";TimerStarted;Sleep;"));
        assert!(lines[1].contains(";AutoSwitch;Sleep;"));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_outside_window_keeps_sleep_and_skips_process_scan() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let mut controller = controller(&dir, (8, 0), &["steam"]);

        let state = controller.enter();
        assert_eq!(state.mode(), ExitMode::Sleep);
        assert!(!state.auto_switch());
        assert_eq!(log_lines(&dir).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn blocked_escalation_names_every_matching_process() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let mut controller = controller(&dir, (0, 30), &["Steam", "rider64", "bash"]);

        let state = controller.enter();
        assert_eq!(state.mode(), ExitMode::Sleep);
        assert!(!state.auto_switch());

        let lines = log_lines(&dir);
        let blocked: Vec<_> = lines.iter().filter(|l| l.contains(";ShutdownBlocked;")).collect();
        assert_eq!(blocked.len(), 1);
        assert!(blocked[0].ends_with(";None;False;Steam,rider64"));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_run_dispatches_initial_mode() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let mut controller = controller(&dir, (3, 0), &[]);

        let outcome = controller.run().await;
        assert_eq!(outcome.mode, ExitMode::ShutDown);
        assert!(outcome.auto_switch);
        assert_eq!(outcome.action, Some(PendingAction::PowerOff));

        let lines = log_lines(&dir);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains(";ProgramEnded;ShutDown;"));
        assert!(lines[2].ends_with(";None;True;"));
    }

    #[tokio::test(start_paused = true)]
    async fn unwritable_log_does_not_change_the_outcome() {
        let dir = tempfile::tempdir().expect("tmpdir");
        let config = CountdownConfig {
            timeout: Duration::from_millis(200),
            log_path: dir.path().to_path_buf(),
            ..CountdownConfig::default()
        };
        let sink = EventSink::new(&config.log_path);
        let mut controller = CountdownController::new(
            config,
            NoKeys(0),
            Vec::new(),
            FixedClock(NaiveTime::from_hms_opt(12, 0, 0).unwrap()),
            sink,
            Console::new(io::sink()),
        );

        let outcome = controller.run().await;
        assert_eq!(outcome.mode, ExitMode::Sleep);
        assert_eq!(outcome.action, Some(PendingAction::Suspend));
    }
}
