//! Key-state engine for Flirc-style IR receivers.
//!
//! Raw 8-byte HID reports are decoded into composite button codes
//! ([`decode`]), and each button runs a small debounce/hold state machine
//! ([`Button`]) driven by press/release edges and periodic ticks. The
//! [`Registry`] ties both together and is shared by the poll and tick
//! workers in [`worker`].

pub mod button;
pub mod clock;
pub mod codes;
pub mod config;
pub mod decode;
pub mod error;
pub mod registry;
pub mod scancode;
pub mod worker;

pub use button::{Button, KeyState};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use codes::{CodeTable, Description, Section};
pub use config::Thresholds;
pub use decode::{decode, DecodedKey, KeyEvent, Modifiers};
pub use error::{ConfigError, DecodeError, TableError};
pub use registry::{ButtonHandle, ButtonObserver, ButtonSnapshot, NullObserver, Registry};
pub use worker::{run_poll_loop, spawn_tick_worker, ReportSource};
