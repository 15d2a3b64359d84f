//! Per-button debounce and hold state machine.
//!
//! Edges (`press`/`release`) only record timestamps. All visible transitions
//! happen in [`Button::tick`], which compares the time since the last edge
//! against the configured [`Thresholds`]. This lets a burst of
//! press/release/press edges coalesce into a single `Pressed`, while a
//! sustained press escalates to `Held` and reports `Released` when let go.

use tracing::debug;

use crate::config::Thresholds;

/// Logical button state reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyState {
    Idle = 0,
    Pressed = 1,
    Held = 2,
    Released = 3,
    Offline = 4,
}

impl KeyState {
    /// Numeric value as reported to the host.
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            KeyState::Idle => "idle",
            KeyState::Pressed => "pressed",
            KeyState::Held => "held",
            KeyState::Released => "released",
            KeyState::Offline => "offline",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Button {
    code: u32,
    description: String,
    state: KeyState,
    /// Start of the current physical press.
    pressed_at: Option<u64>,
    /// Release edge still waiting to be trusted.
    released_at: Option<u64>,
}

impl Button {
    pub fn new(code: u32, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            state: KeyState::Idle,
            pressed_at: None,
            released_at: None,
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    /// Record a press edge. Repeated presses keep the original start time.
    pub fn press(&mut self, now: u64) {
        self.released_at = None;
        if self.pressed_at.is_none() {
            self.pressed_at = Some(now);
        }
    }

    /// Record a release edge. Only the first release of a burst is kept.
    pub fn release(&mut self, now: u64) {
        if self.released_at.is_none() {
            self.released_at = Some(now);
        }
    }

    /// Resolve pending edges against elapsed time.
    ///
    /// Returns `true` when the visible state changed.
    pub fn tick(&mut self, now: u64, thresholds: &Thresholds) -> bool {
        if let Some(released_at) = self.released_at {
            let lapsed = now.saturating_sub(released_at);
            if lapsed > thresholds.release_ms {
                self.pressed_at = None;
                match self.state {
                    KeyState::Idle => return self.transition(KeyState::Pressed),
                    KeyState::Held => return self.transition(KeyState::Released),
                    _ if lapsed > thresholds.idle_ms => {
                        self.released_at = None;
                        return self.transition(KeyState::Idle);
                    }
                    _ => {}
                }
            }
        }

        if let Some(pressed_at) = self.pressed_at {
            if self.state != KeyState::Held && now.saturating_sub(pressed_at) > thresholds.held_ms
            {
                return self.transition(KeyState::Held);
            }
        }

        false
    }

    /// Reset to a clean idle button (device (re)connected).
    pub fn idle(&mut self) {
        self.state = KeyState::Idle;
        self.pressed_at = None;
        self.released_at = None;
    }

    /// Mark the button unavailable (device disconnected).
    pub fn offline(&mut self) {
        self.state = KeyState::Offline;
    }

    /// A press edge with no release after it.
    pub fn is_down(&self) -> bool {
        self.pressed_at.is_some() && self.released_at.is_none()
    }

    /// Idle with no pending edges, so there is nothing left to tick.
    pub fn is_idle(&self) -> bool {
        self.state == KeyState::Idle && self.pressed_at.is_none() && self.released_at.is_none()
    }

    fn transition(&mut self, state: KeyState) -> bool {
        debug!(
            "{} ({:#x}) {} -> {}",
            self.description,
            self.code,
            self.state.name(),
            state.name()
        );
        self.state = state;
        true
    }
}
