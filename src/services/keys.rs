//! Keyboard sampling

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

/// Logical keys the countdown reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Cancel,
    ToggleReboot,
    TogglePrimary,
}

impl Key {
    /// Label written to the event log
    pub fn label(&self) -> &'static str {
        match self {
            Key::Cancel => "ESC",
            Key::ToggleReboot => "ADD",
            Key::TogglePrimary => "Enter",
        }
    }

    /// Map a terminal key event onto a logical key
    pub fn from_event(event: &KeyEvent) -> Option<Self> {
        match event.code {
            KeyCode::Esc => Some(Key::Cancel),
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Key::Cancel)
            }
            // Main-row and keypad plus; '=' + Shift when the terminal reports base keys
            KeyCode::Char('+') => Some(Key::ToggleReboot),
            KeyCode::Char('=') if event.modifiers.contains(KeyModifiers::SHIFT) => {
                Some(Key::ToggleReboot)
            }
            KeyCode::Enter => Some(Key::TogglePrimary),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            Key::Cancel => 0,
            Key::ToggleReboot => 1,
            Key::TogglePrimary => 2,
        }
    }
}

/// State of a key at the moment it is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Not pressed
    Idle,
    /// Pressed since the previous sample but already released
    Tapped,
    /// Down right now
    Held,
}

impl KeyState {
    /// Any non-idle reading
    pub fn is_active(&self) -> bool {
        *self != KeyState::Idle
    }
}

/// Source of key states, queried once per key per poll tick
pub trait KeySampler {
    fn sample(&mut self, key: Key) -> KeyState;
}

#[derive(Debug, Clone, Copy, Default)]
struct Tracked {
    down: bool,
    pressed_since_sample: bool,
}

/// Per-key bookkeeping fed by terminal key events.
///
/// A key only reads as held while presses or repeats keep arriving: one
/// sample without either and it is treated as released, whether or not a
/// release event was ever delivered.
#[derive(Debug, Clone, Default)]
pub struct KeyBoard {
    keys: [Tracked; 3],
}

impl KeyBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &KeyEvent) {
        let Some(key) = Key::from_event(event) else {
            return;
        };
        let tracked = &mut self.keys[key.index()];
        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                tracked.down = true;
                tracked.pressed_since_sample = true;
            }
            KeyEventKind::Release => tracked.down = false,
        }
    }

    /// Read a key and clear its pressed-since-sample flag
    pub fn take(&mut self, key: Key) -> KeyState {
        let tracked = &mut self.keys[key.index()];
        let fresh = tracked.pressed_since_sample;
        let state = match (tracked.down, fresh) {
            (true, true) => KeyState::Held,
            (false, true) => KeyState::Tapped,
            (_, false) => KeyState::Idle,
        };
        if !fresh {
            tracked.down = false;
        }
        tracked.pressed_since_sample = false;
        state
    }
}

/// Samples keys from the controlling terminal without blocking
#[derive(Debug)]
pub struct TerminalKeySampler {
    board: KeyBoard,
}

impl TerminalKeySampler {
    pub fn new() -> Self {
        Self {
            board: KeyBoard::new(),
        }
    }

    /// Pull every pending terminal event into the key board
    fn drain(&mut self) {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key_event)) => self.board.apply(&key_event),
                    Ok(_) => {}
                    Err(e) => {
                        debug!("Failed to read terminal event: {}", e);
                        break;
                    }
                },
                Ok(false) => break,
                Err(e) => {
                    debug!("Failed to poll terminal events: {}", e);
                    break;
                }
            }
        }
    }
}

impl Default for TerminalKeySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySampler for TerminalKeySampler {
    fn sample(&mut self, key: Key) -> KeyState {
        self.drain();
        self.board.take(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CountdownState, ExitMode};
    use crossterm::event::KeyEventState;

    fn event(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn bindings() {
        let bound = |code| Key::from_event(&event(code, KeyEventKind::Press));
        assert_eq!(bound(KeyCode::Esc), Some(Key::Cancel));
        assert_eq!(bound(KeyCode::Char('+')), Some(Key::ToggleReboot));
        assert_eq!(bound(KeyCode::Enter), Some(Key::TogglePrimary));
        assert_eq!(bound(KeyCode::Char('c')), None);
        assert_eq!(bound(KeyCode::Char('=')), None);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Key::from_event(&ctrl_c), Some(Key::Cancel));

        let shifted_equals = KeyEvent::new(KeyCode::Char('='), KeyModifiers::SHIFT);
        assert_eq!(Key::from_event(&shifted_equals), Some(Key::ToggleReboot));

        let mut keypad_plus = event(KeyCode::Char('+'), KeyEventKind::Press);
        keypad_plus.state = KeyEventState::KEYPAD;
        assert_eq!(Key::from_event(&keypad_plus), Some(Key::ToggleReboot));
    }

    #[test]
    fn press_without_release_is_held_for_one_sample() {
        let mut board = KeyBoard::new();
        board.apply(&event(KeyCode::Enter, KeyEventKind::Press));
        assert_eq!(board.take(Key::TogglePrimary), KeyState::Held);
        assert_eq!(board.take(Key::TogglePrimary), KeyState::Idle);
        assert_eq!(board.take(Key::TogglePrimary), KeyState::Idle);
    }

    #[test]
    fn press_and_release_between_samples_reads_as_tapped() {
        let mut board = KeyBoard::new();
        board.apply(&event(KeyCode::Enter, KeyEventKind::Press));
        board.apply(&event(KeyCode::Enter, KeyEventKind::Release));
        assert_eq!(board.take(Key::TogglePrimary), KeyState::Tapped);
        assert_eq!(board.take(Key::TogglePrimary), KeyState::Idle);
    }

    #[test]
    fn repeats_keep_a_key_held_until_they_stop() {
        let mut board = KeyBoard::new();
        board.apply(&event(KeyCode::Char('+'), KeyEventKind::Press));
        assert_eq!(board.take(Key::ToggleReboot), KeyState::Held);
        board.apply(&event(KeyCode::Char('+'), KeyEventKind::Repeat));
        assert_eq!(board.take(Key::ToggleReboot), KeyState::Held);
        assert_eq!(board.take(Key::ToggleReboot), KeyState::Idle);

        board.apply(&event(KeyCode::Char('+'), KeyEventKind::Release));
        assert_eq!(board.take(Key::ToggleReboot), KeyState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn lost_releases_do_not_stall_the_countdown() {
        let mut board = KeyBoard::new();
        board.apply(&event(KeyCode::Char('+'), KeyEventKind::Press));
        board.apply(&event(KeyCode::Enter, KeyEventKind::Press));

        let mut state = CountdownState::new(Duration::from_secs(2));
        let mut transitions = 0;
        let mut ticks = 0;
        while !state.stopwatch().is_expired() && ticks < 200 {
            transitions += state.tick(|key| board.take(key)).transitions.len();
            tokio::time::sleep(Duration::from_millis(50)).await;
            ticks += 1;
        }

        assert!(state.stopwatch().is_expired(), "still counting after {} ticks", ticks);
        assert_eq!(transitions, 2);
        assert_eq!(state.mode(), ExitMode::ShutDown);
        assert!(ticks <= 41);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut board = KeyBoard::new();
        board.apply(&event(KeyCode::Char('x'), KeyEventKind::Press));
        assert_eq!(board.take(Key::Cancel), KeyState::Idle);
        assert_eq!(board.take(Key::ToggleReboot), KeyState::Idle);
        assert_eq!(board.take(Key::TogglePrimary), KeyState::Idle);
    }
}
