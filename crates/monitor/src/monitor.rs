//! Door polling state machine.
//!
//! [`DoorMonitor`] owns every monitored door and its input pin. Each sweep
//! reads the doors one after another in configured order and compares the
//! observed level with the level stored by the previous sweep. On a mismatch
//! it stores and publishes the new level first, then captures snapshots and
//! sends the notification before moving on to the next door. Snapshot files
//! are removed once the notification has been attempted. The sweep
//! blocks for the whole capture burst and email round trip; both are
//! bounded by their own timeouts.
//!
//! Sweeps run with a fixed delay between the end of one sweep and the start
//! of the next. Only levels at sweep boundaries are seen, so a door that
//! opens and closes again between two sweeps produces no event.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use doorwatch_core::config::DoorConfig;
use doorwatch_core::door::{detect_transition, DoorState, TransitionEvent};
use doorwatch_core::types::Timestamp;
use doorwatch_events::{ImageCapture, Notifier};
use tokio_util::sync::CancellationToken;

use crate::board::DoorBoard;
use crate::pin::{PinError, SensorInput};

/// Default delay between sweeps.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// One door contact under observation.
pub struct MonitoredDoor {
    config: DoorConfig,
    input: Box<dyn SensorInput>,
    /// Level stored at the end of the previous sweep.
    last_open: bool,
}

impl MonitoredDoor {
    /// Start tracking `config` from its configured initial level.
    pub fn new(config: DoorConfig, input: Box<dyn SensorInput>) -> Self {
        let last_open = config.open;
        Self {
            config,
            input,
            last_open,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.door
    }

    pub fn is_open(&self) -> bool {
        self.last_open
    }

    /// Read the contact and translate the raw level into open/closed.
    fn observe(&mut self) -> Result<bool, PinError> {
        Ok(self.input.is_high()? != self.config.invert)
    }
}

/// Polls the monitored set and reacts to door transitions.
pub struct DoorMonitor {
    doors: Vec<MonitoredDoor>,
    board: DoorBoard,
    capture: ImageCapture,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl DoorMonitor {
    pub fn new(
        doors: Vec<MonitoredDoor>,
        board: DoorBoard,
        capture: ImageCapture,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
    ) -> Self {
        Self {
            doors,
            board,
            capture,
            notifier,
            interval,
        }
    }

    pub fn doors(&self) -> &[MonitoredDoor] {
        &self.doors
    }

    /// Run sweeps until `cancel` fires.
    ///
    /// A sweep in progress is allowed to finish. The monitor, and with it
    /// every input pin, is dropped when this returns.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            doors = self.doors.len(),
            interval_ms = self.interval.as_millis() as u64,
            "Door monitor started",
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let events = self.sweep().await;
            if !events.is_empty() {
                tracing::debug!(transitions = events.len(), "Sweep complete");
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Door monitor stopping, releasing GPIO pins");
    }

    /// Perform one full sweep over the monitored set.
    ///
    /// Returns the transition events handled in this sweep, in door order.
    pub async fn sweep(&mut self) -> Vec<TransitionEvent> {
        let mut events = Vec::new();

        for index in 0..self.doors.len() {
            let door = &mut self.doors[index];

            let observed = match door.observe() {
                Ok(open) => open,
                Err(e) => {
                    tracing::warn!(door = %door.config.door, error = %e, "Failed to read door contact");
                    continue;
                }
            };

            let Some(state) = detect_transition(door.last_open, observed) else {
                continue;
            };

            // Store before any side effect so the edge is never handled twice.
            door.last_open = observed;
            let at = Utc::now();
            self.board.publish(index, observed, at).await;

            let config = &self.doors[index].config;
            events.push(dispatch(config, &self.capture, self.notifier.as_ref(), state, at).await);
        }

        events
    }
}

/// Capture snapshots for a transition on `config`, notify, then delete the
/// snapshots whatever the delivery outcome.
///
/// Borrows collaborators individually: `DoorMonitor` is not `Sync` since
/// pins are only `Send`, and the sweep future must stay `Send`.
async fn dispatch(
    config: &DoorConfig,
    capture: &ImageCapture,
    notifier: &dyn Notifier,
    state: DoorState,
    at: Timestamp,
) -> TransitionEvent {
    let mut event = TransitionEvent::new(config.door.clone(), state, at);
    let subject = event.subject();

    tracing::info!(door = %config.door, state = state.event_label(), "{subject}");

    event.images = capture
        .capture(
            &config.door,
            config.image_url(),
            config.image_count,
            config.image_delay(),
            at,
        )
        .await;

    if let Err(e) = notifier
        .notify(&subject, &event.body_html(), &event.images)
        .await
    {
        tracing::error!(
            door = %config.door,
            attachments = event.images.len(),
            error = %e,
            "Failed to send door notification",
        );
    }

    capture.discard(&event.images).await;

    event
}
