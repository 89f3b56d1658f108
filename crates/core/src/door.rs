//! Door states, transition detection and event text.
//!
//! A door contact is a binary sensor: the only edges are
//! `Closed -> Open` and `Open -> Closed`. Edge detection compares the level
//! observed in the current sweep with the level stored at the end of the
//! previous sweep, so a door that flips twice between two sweeps is never
//! reported.

use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Display format for event times (local time), e.g. `Mon Jan  2 15:04:05 2006`.
pub const EVENT_TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Subject of the one-time notification sent when the process starts.
pub const STARTUP_SUBJECT: &str = "Home Monitor Has Started <eom>";

/// Subject of the diagnostic notification triggered over HTTP.
pub const TEST_SUBJECT: &str = "Test Email From Home Monitor";

/// Body of the diagnostic notification triggered over HTTP.
pub const TEST_BODY: &str = "OK!";

// ---------------------------------------------------------------------------
// DoorState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    Open,
    Closed,
}

impl DoorState {
    pub fn from_open(open: bool) -> Self {
        if open {
            Self::Open
        } else {
            Self::Closed
        }
    }

    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    /// Past-tense label used in notifications ("Garage has Opened").
    pub fn event_label(self) -> &'static str {
        match self {
            Self::Open => "Opened",
            Self::Closed => "Closed",
        }
    }
}

/// Compare the stored level with a fresh observation.
///
/// Returns the new state on a mismatch and `None` when the levels are equal.
pub fn detect_transition(last_open: bool, observed_open: bool) -> Option<DoorState> {
    if last_open == observed_open {
        None
    } else {
        Some(DoorState::from_open(observed_open))
    }
}

// ---------------------------------------------------------------------------
// DoorStatus
// ---------------------------------------------------------------------------

/// Published view of one monitored door, as served by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoorStatus {
    pub door: String,
    pub open: bool,
    pub gpio_pin: u8,
    /// `None` until the monitor observes the first transition.
    pub last_changed_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// TransitionEvent
// ---------------------------------------------------------------------------

/// A detected edge on one door, alive for a single sweep iteration.
#[derive(Debug, Clone)]
pub struct TransitionEvent {
    pub door: String,
    pub state: DoorState,
    pub at: Timestamp,
    /// Snapshot files captured for this event, in fetch order. The files are
    /// deleted after the notification attempt; only the paths remain.
    pub images: Vec<PathBuf>,
}

impl TransitionEvent {
    pub fn new(door: impl Into<String>, state: DoorState, at: Timestamp) -> Self {
        Self {
            door: door.into(),
            state,
            at,
            images: Vec::new(),
        }
    }

    /// Notification subject, e.g. `Garage has Opened at Mon Jan  2 15:04:05 2006`.
    pub fn subject(&self) -> String {
        format!(
            "{} has {} at {}",
            self.door,
            self.state.event_label(),
            format_event_time(self.at)
        )
    }

    /// HTML notification body listing door, state and time.
    pub fn body_html(&self) -> String {
        format!(
            "<h3>Door Event Triggered</h3>\n\
             <ul>\n\
             \t<li><b>Door:</b> {}</li>\n\
             \t<li><b>State:</b> {}</li>\n\
             \t<li><b>Time:</b> {}</li>\n\
             </ul>\n",
            self.door,
            self.state.event_label(),
            format_event_time(self.at)
        )
    }
}

/// Render a timestamp in local time using [`EVENT_TIME_FORMAT`].
pub fn format_event_time(at: Timestamp) -> String {
    at.with_timezone(&Local).format(EVENT_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_time() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 5).unwrap()
    }

    #[test]
    fn equal_levels_are_not_a_transition() {
        assert_eq!(detect_transition(false, false), None);
        assert_eq!(detect_transition(true, true), None);
    }

    #[test]
    fn level_change_yields_new_state() {
        assert_eq!(detect_transition(false, true), Some(DoorState::Open));
        assert_eq!(detect_transition(true, false), Some(DoorState::Closed));
    }

    #[test]
    fn event_labels() {
        assert_eq!(DoorState::Open.event_label(), "Opened");
        assert_eq!(DoorState::Closed.event_label(), "Closed");
        assert!(DoorState::from_open(true).is_open());
        assert!(!DoorState::from_open(false).is_open());
    }

    #[test]
    fn subject_names_door_state_and_time() {
        let event = TransitionEvent::new("Garage", DoorState::Open, sample_time());
        let expected = format!("Garage has Opened at {}", format_event_time(sample_time()));
        assert_eq!(event.subject(), expected);
    }

    #[test]
    fn body_lists_door_state_and_time() {
        let event = TransitionEvent::new("Back Door", DoorState::Closed, sample_time());
        let body = event.body_html();

        assert!(body.starts_with("<h3>Door Event Triggered</h3>"));
        assert!(body.contains("<li><b>Door:</b> Back Door</li>"));
        assert!(body.contains("<li><b>State:</b> Closed</li>"));
        assert!(body.contains(&format!(
            "<li><b>Time:</b> {}</li>",
            format_event_time(sample_time())
        )));
    }

    #[test]
    fn event_time_contains_year_and_clock() {
        let rendered = format_event_time(sample_time());
        assert!(rendered.ends_with("2024"));
        assert_eq!(rendered.matches(':').count(), 2);
    }

    #[test]
    fn door_state_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&DoorState::Open).unwrap(), "\"open\"");
        assert_eq!(
            serde_json::to_string(&DoorState::Closed).unwrap(),
            "\"closed\""
        );
    }

    #[test]
    fn door_status_serializes_null_until_changed() {
        let status = DoorStatus {
            door: "Garage".into(),
            open: false,
            gpio_pin: 17,
            last_changed_at: None,
        };
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["door"], "Garage");
        assert_eq!(json["open"], false);
        assert_eq!(json["gpio_pin"], 17);
        assert!(json["last_changed_at"].is_null());
    }
}
