//! Console output: banners, status lines and the live progress bar

use std::{
    io::{self, Write},
    time::Duration,
};

use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::state::{timer_state::progress_percent, ExitMode};

/// Width of the progress bar in characters
pub const BAR_WIDTH: usize = 50;

/// Render the bar text: `[=====     ] 10% (1.8 s)`
pub fn render_progress(elapsed: Duration, timeout: Duration) -> String {
    let percent = progress_percent(elapsed, timeout) as usize;
    let filled = percent * BAR_WIDTH / 100;
    let remaining = timeout.saturating_sub(elapsed).as_secs_f64();
    format!(
        "[{}{}] {}% ({:.1} s)",
        "=".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        percent,
        remaining
    )
}

/// Bar color for a mode
pub fn mode_color(mode: ExitMode) -> Option<Color> {
    match mode {
        ExitMode::Sleep => Some(Color::DarkYellow),
        ExitMode::ShutDown => Some(Color::DarkRed),
        ExitMode::Reboot => Some(Color::DarkCyan),
        ExitMode::None | ExitMode::Cancel => None,
    }
}

/// Line-oriented console writer.
///
/// Lines end in `\r\n` so output stays aligned while the terminal is in raw
/// mode. Write failures are ignored.
pub struct Console {
    out: Box<dyn Write + Send>,
}

impl Console {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn banner(&mut self, title: &str) {
        let rule = "=".repeat(25);
        self.line(&rule);
        self.line(&format!("{:^25}", title));
        self.line(&rule);
    }

    pub fn info(&mut self, message: &str) {
        self.line(&format!("[INFO] {}", message));
    }

    pub fn success(&mut self, message: &str) {
        self.line(&format!("[SUCCESS] {}", message));
    }

    pub fn error(&mut self, message: &str) {
        self.line(&format!("[ERROR] {}", message));
    }

    pub fn debug(&mut self, message: &str) {
        self.line(&format!("[DEBUG] {}", message));
    }

    pub fn blank(&mut self) {
        self.line("");
    }

    /// Keep the last drawn progress bar and move below it
    pub fn finish_progress(&mut self) {
        let _ = queue!(self.out, Print("\r\n"));
        let _ = self.out.flush();
    }

    /// Redraw the progress bar in place, colored by mode
    pub fn progress(&mut self, mode: ExitMode, elapsed: Duration, timeout: Duration) {
        let text = render_progress(elapsed, timeout);
        let _ = queue!(self.out, Print('\r'));
        let _ = match mode_color(mode) {
            Some(color) => queue!(self.out, SetForegroundColor(color), Print(text), ResetColor),
            None => queue!(self.out, Print(text)),
        };
        let _ = self.out.flush();
    }

    /// Replace the current line with `text` and move to the next one
    pub fn line(&mut self, text: &str) {
        let _ = queue!(
            self.out,
            Print('\r'),
            Clear(ClearType::CurrentLine),
            Print(text),
            Print("\r\n")
        );
        let _ = self.out.flush();
    }
}
