//! Sleep Countdown - suspend, shut down or reboot after a short countdown
//! 
//! This is the main entry point for the sleep-countdown application.

use std::io;

use tracing::{debug, info, warn};

use sleep_countdown::{
    config::{Cli, CountdownConfig},
    events::{EventKind, EventSink, TransitionRecord},
    services::{PendingAction, SystemClock, SystemProcesses, TerminalKeySampler},
    tasks::{log_event, record_lifecycle, CountdownController, LifecycleHook},
    utils::{shutdown_signal, Console, TerminalGuard},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing on stderr, away from the progress bar
    tracing_subscriber::fmt()
        .with_env_filter(format!("sleep_countdown={}", cli.log_level()))
        .with_writer(io::stderr)
        .init();

    let config = CountdownConfig::default();
    info!("Starting sleep-countdown v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: timeout={:?}, log={}", config.timeout, config.log_path.display());

    let mut console = Console::stdout();
    let sink = EventSink::new(&config.log_path);
    if let Err(e) = sink.ensure_header() {
        warn!("Failed to create log header: {}", e);
        console.error(&format!("Failed to write to the log: {}", e));
    }

    console.banner("Sleep Countdown");

    let hook = if cli.startup {
        Some(LifecycleHook::Startup)
    } else if cli.shutdown {
        Some(LifecycleHook::Shutdown)
    } else {
        None
    };

    let action = match hook {
        Some(hook) => {
            record_lifecycle(&sink, &mut console, hook);
            None
        }
        None => {
            let (action, returned) = run_countdown(config, sink, console).await;
            console = returned;
            action
        }
    };

    console.blank();
    console.banner("Program End");

    if let Some(action) = action {
        execute(action, cli.dry_run, &mut console).await;
    }

    Ok(())
}

/// Run the interactive countdown with the terminal in raw mode
async fn run_countdown(
    config: CountdownConfig,
    sink: EventSink,
    mut console: Console,
) -> (Option<PendingAction>, Console) {
    let guard = TerminalGuard::new();
    match guard.enable_raw_mode() {
        Ok(()) => {
            let releases = guard.enable_key_releases(&mut io::stdout());
            debug!("Terminal reports key releases: {}", releases);
        }
        Err(e) => {
            warn!("Keyboard input unavailable: {}", e);
            console.error("Keyboard input is unavailable; the countdown cannot be cancelled.");
        }
    }

    let mut controller = CountdownController::new(
        config,
        TerminalKeySampler::new(),
        SystemProcesses::new(),
        SystemClock,
        sink.clone(),
        console,
    );

    let outcome = tokio::select! {
        outcome = controller.run() => Some(outcome),
        _ = shutdown_signal() => None,
    };

    let mut console = controller.into_console();
    drop(guard);

    match outcome {
        Some(outcome) => (outcome.action, console),
        None => {
            info!("Countdown interrupted by signal");
            console.blank();
            console.info("Interrupted. No action taken.");
            let record = TransitionRecord::lifecycle(EventKind::Interrupted).with_success(false);
            log_event(&sink, &mut console, record);
            (None, console)
        }
    }
}

/// Execute the decided power action after all output has been written
async fn execute(action: PendingAction, dry_run: bool, console: &mut Console) {
    if dry_run {
        console.debug(&format!("{}.", action.describe()));
        return;
    }

    if let Err(e) = action.execute().await {
        tracing::error!("{} failed: {}", action.describe(), e);
        console.error(&format!("{} failed: {}", action.describe(), e));
    }
}
