pub mod health;
pub mod home;

use axum::Router;

use crate::state::AppState;

/// Build the `/home` route tree.
///
/// ```text
/// /status                 all doors
/// /status/{door}          one door by name
/// /test/email             send the diagnostic notification
/// ```
pub fn home_routes() -> Router<AppState> {
    home::router()
}
