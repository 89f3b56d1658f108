//! Handlers for the home status surface.
//!
//! Status reads come from the [`DoorBoard`](doorwatch_monitor::DoorBoard)
//! snapshot and never touch the GPIO pins.

use axum::extract::{Path, State};
use axum::Json;
use doorwatch_core::door::{DoorStatus, TEST_BODY, TEST_SUBJECT};
use doorwatch_core::error::CoreError;
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Body of `GET /home/status`.
#[derive(Debug, Serialize)]
pub struct HomeStatus {
    pub doors: Vec<DoorStatus>,
}

/// GET /home/status
pub async fn get_status(State(state): State<AppState>) -> Json<HomeStatus> {
    Json(HomeStatus {
        doors: state.board.snapshot().await,
    })
}

/// GET /home/status/{door}
pub async fn get_door_status(
    State(state): State<AppState>,
    Path(door): Path<String>,
) -> AppResult<Json<DoorStatus>> {
    let status = state.board.get(&door).await.ok_or(CoreError::NotFound {
        entity: "Door",
        id: door,
    })?;
    Ok(Json(status))
}

/// GET /home/test/email
///
/// Sends the diagnostic notification with no attachments. Always responds
/// 200; the body is `"OK"` or the delivery error text.
pub async fn send_test_email(State(state): State<AppState>) -> Json<String> {
    match state.notifier.notify(TEST_SUBJECT, TEST_BODY, &[]).await {
        Ok(()) => {
            tracing::info!("Diagnostic email sent");
            Json("OK".to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Diagnostic email failed");
            Json(e.to_string())
        }
    }
}
