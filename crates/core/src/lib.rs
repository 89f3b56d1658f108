//! Doorwatch domain core.
//!
//! Pure logic shared by the monitor, the delivery channels and the HTTP
//! surface: door states and transition detection, event text, snapshot
//! naming, and loading of the door/mail configuration files.

pub mod config;
pub mod door;
pub mod error;
pub mod naming;
pub mod types;
