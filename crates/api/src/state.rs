use std::sync::Arc;

use doorwatch_events::Notifier;
use doorwatch_monitor::DoorBoard;

/// Shared application state available to all Axum handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Read handle to the door table published by the monitor.
    pub board: DoorBoard,
    /// Notification channel, used by the diagnostic email endpoint.
    pub notifier: Arc<dyn Notifier>,
}
