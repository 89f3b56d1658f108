use axum::routing::get;
use axum::Router;

use crate::handlers::home;
use crate::state::AppState;

/// Routes mounted at `/home`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(home::get_status))
        .route("/status/{door}", get(home::get_door_status))
        .route("/test/email", get(home::send_test_email))
}
