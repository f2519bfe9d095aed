//! Terminal raw-mode handling with restore on drop and on panic

use std::{
    io::{self, Write},
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        OnceLock,
    },
};

use crossterm::{
    cursor::Show,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement},
};
use tracing::debug;

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static KEY_RELEASES_ENABLED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// RAII guard that puts the terminal into key-polling mode and restores it
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn new() -> Self {
        install_terminal_panic_hook();
        TerminalGuard
    }

    pub fn enable_raw_mode(&self) -> io::Result<()> {
        enable_raw_mode()?;
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Ask the terminal to report every key as an escape code with its event
    /// type, so releases and repeats arrive for Enter, Esc and `+` too.
    ///
    /// Returns whether the terminal accepted the request.
    pub fn enable_key_releases(&self, stdout: &mut impl Write) -> bool {
        match supports_keyboard_enhancement() {
            Ok(true) => {}
            Ok(false) => return false,
            Err(e) => {
                debug!("Keyboard enhancement query failed: {}", e);
                return false;
            }
        }
        let flags = KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
            | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS;
        match execute!(stdout, PushKeyboardEnhancementFlags(flags)) {
            Ok(()) => {
                KEY_RELEASES_ENABLED.store(true, Ordering::SeqCst);
                true
            }
            Err(e) => {
                debug!("Failed to enable key release reporting: {}", e);
                false
            }
        }
    }
}

impl Default for TerminalGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let mut stdout = io::stdout();
    if KEY_RELEASES_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
    }
    let _ = execute!(stdout, Show);
    let _ = stdout.flush();
}

fn install_terminal_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}
