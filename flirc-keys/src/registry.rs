//! Button registry and report dispatcher.
//!
//! The registry is shared between the poll worker (edges) and the tick worker
//! (time). Everything mutable lives behind one mutex; observer callbacks run
//! after the lock is dropped and only see copied values.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::button::{Button, KeyState};
use crate::clock::Clock;
use crate::codes::CodeTable;
use crate::config::Thresholds;
use crate::decode::KeyEvent;

/// Host-side hooks for button discovery and state changes.
pub trait ButtonObserver: Send + Sync {
    fn button_discovered(&self, _code: u32, _description: &str) {}
    fn state_changed(&self, _code: u32, _state: KeyState) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl ButtonObserver for NullObserver {}

/// Reference to a registered button by its composite code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ButtonHandle(u32);

impl ButtonHandle {
    pub fn code(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSnapshot {
    pub code: u32,
    pub description: String,
    pub state: KeyState,
}

enum Notice {
    Discovered(u32, String),
    Changed(u32, KeyState),
}

struct Inner {
    thresholds: Thresholds,
    buttons: HashMap<u32, Button>,
    /// Buttons with pending time-based work.
    ticking: BTreeSet<ButtonHandle>,
    /// Most recently pressed button, released by a "no key" report.
    active: Option<ButtonHandle>,
}

impl Inner {
    fn resolve(
        &mut self,
        code: u32,
        describe: impl FnOnce() -> String,
        notices: &mut Vec<Notice>,
    ) -> ButtonHandle {
        self.buttons.entry(code).or_insert_with(|| {
            let description = describe();
            info!("Discovered button {code:#x}: {description}");
            notices.push(Notice::Discovered(code, description.clone()));
            Button::new(code, description)
        });
        ButtonHandle(code)
    }

    fn release_active(&mut self, now: u64) {
        if let Some(handle) = self.active.take() {
            if let Some(button) = self.buttons.get_mut(&handle.0) {
                button.release(now);
            }
        }
    }

    /// Release every ticking button that is still down.
    fn release_all(&mut self, now: u64) {
        self.active = None;
        for handle in &self.ticking {
            if let Some(button) = self.buttons.get_mut(&handle.0) {
                if button.is_down() {
                    button.release(now);
                }
            }
        }
    }

    /// Apply `apply` to every button and stop all ticking, reporting state moves.
    fn force_all(&mut self, apply: fn(&mut Button), notices: &mut Vec<Notice>) {
        self.ticking.clear();
        self.active = None;
        for button in self.buttons.values_mut() {
            let before = button.state();
            apply(button);
            if button.state() != before {
                notices.push(Notice::Changed(button.code(), button.state()));
            }
        }
    }
}

pub struct Registry {
    table: CodeTable,
    clock: Box<dyn Clock>,
    observer: Arc<dyn ButtonObserver>,
    inner: Mutex<Inner>,
}

impl Registry {
    pub fn new(
        table: CodeTable,
        thresholds: Thresholds,
        clock: impl Clock + 'static,
        observer: Arc<dyn ButtonObserver>,
    ) -> Self {
        Self {
            table,
            clock: Box::new(clock),
            observer,
            inner: Mutex::new(Inner {
                thresholds,
                buttons: HashMap::new(),
                ticking: BTreeSet::new(),
                active: None,
            }),
        }
    }

    pub fn set_thresholds(&self, thresholds: Thresholds) {
        debug!("Thresholds: {thresholds:?}");
        self.inner.lock().thresholds = thresholds;
    }

    /// Existing button for `code`, or a new one described by `describe`.
    pub fn resolve(&self, code: u32, describe: impl FnOnce() -> String) -> ButtonHandle {
        let mut notices = Vec::new();
        let handle = self.inner.lock().resolve(code, describe, &mut notices);
        self.notify(notices);
        handle
    }

    /// Feed one decoded report.
    pub fn on_report(&self, event: &KeyEvent) {
        let now = self.clock.now_ms();
        let mut notices = Vec::new();
        {
            let mut inner = self.inner.lock();
            match event {
                KeyEvent::Release => inner.release_active(now),
                KeyEvent::Press(key) => {
                    let handle =
                        inner.resolve(key.code, || key.describe(&self.table), &mut notices);
                    if let Some(button) = inner.buttons.get_mut(&handle.0) {
                        button.press(now);
                    }
                    inner.active = Some(handle);
                    inner.ticking.insert(handle);
                }
            }
        }
        self.notify(notices);
    }

    /// A read timed out: nothing is held down any more.
    pub fn on_read_timeout(&self) {
        let now = self.clock.now_ms();
        self.inner.lock().release_all(now);
    }

    /// Tick every button with pending work. Returns the number that changed.
    pub fn tick_all(&self) -> usize {
        let now = self.clock.now_ms();
        let mut notices = Vec::new();
        {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let thresholds = inner.thresholds;
            let buttons = &mut inner.buttons;
            inner.ticking.retain(|handle| {
                let Some(button) = buttons.get_mut(&handle.0) else {
                    return false;
                };
                if button.tick(now, &thresholds) {
                    notices.push(Notice::Changed(button.code(), button.state()));
                }
                !button.is_idle()
            });
        }
        let changed = notices.len();
        self.notify(notices);
        changed
    }

    /// Reset every button to idle (device connected).
    pub fn idle_all(&self) {
        let mut notices = Vec::new();
        self.inner.lock().force_all(Button::idle, &mut notices);
        self.notify(notices);
    }

    /// Mark every button offline (device lost).
    pub fn offline_all(&self) {
        let mut notices = Vec::new();
        self.inner.lock().force_all(Button::offline, &mut notices);
        self.notify(notices);
    }

    pub fn state(&self, code: u32) -> Option<KeyState> {
        self.inner.lock().buttons.get(&code).map(Button::state)
    }

    /// Buttons still waiting on a tick.
    pub fn pending(&self) -> usize {
        self.inner.lock().ticking.len()
    }

    /// All known buttons, ordered by code.
    pub fn snapshot(&self) -> Vec<ButtonSnapshot> {
        let inner = self.inner.lock();
        let mut buttons: Vec<ButtonSnapshot> = inner
            .buttons
            .values()
            .map(|b| ButtonSnapshot {
                code: b.code(),
                description: b.description().to_string(),
                state: b.state(),
            })
            .collect();
        buttons.sort_by_key(|b| b.code);
        buttons
    }

    fn notify(&self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::Discovered(code, description) => {
                    self.observer.button_discovered(code, &description)
                }
                Notice::Changed(code, state) => self.observer.state_changed(code, state),
            }
        }
    }
}
