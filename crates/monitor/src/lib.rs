//! `doorwatch-monitor` library crate.
//!
//! - [`pin`]: digital input capability and its GPIO adapters.
//! - [`board`]: the published door table read by the status surface.
//! - [`monitor`]: the polling state machine that detects transitions and
//!   drives snapshot capture and notification.

pub mod board;
pub mod monitor;
pub mod pin;

pub use board::DoorBoard;
pub use monitor::{DoorMonitor, MonitoredDoor};
pub use pin::{PinError, SensorInput};
