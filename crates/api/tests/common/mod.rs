#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use doorwatch_core::door::DoorStatus;
use doorwatch_events::{EmailError, Notifier};
use doorwatch_monitor::DoorBoard;
use http_body_util::BodyExt;
use tower::ServiceExt;

use doorwatch_api::config::ServerConfig;
use doorwatch_api::router::build_app_router;
use doorwatch_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
    }
}

/// Notifier double that records every message and optionally fails.
///
/// With `fail_on` empty, `fail_with` applies to every call; otherwise only
/// the listed zero-based call numbers fail.
#[derive(Default)]
pub struct RecordingNotifier {
    pub fail_with: Option<String>,
    pub fail_on: Vec<usize>,
    pub sent: Mutex<Vec<(String, String, Vec<PathBuf>)>>,
}

impl RecordingNotifier {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_on(calls: &[usize], message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            fail_on: calls.to_vec(),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String, Vec<PathBuf>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        subject: &str,
        body_html: &str,
        attachments: &[PathBuf],
    ) -> Result<(), EmailError> {
        let call = {
            let mut sent = self.sent.lock().unwrap();
            sent.push((
                subject.to_string(),
                body_html.to_string(),
                attachments.to_vec(),
            ));
            sent.len() - 1
        };
        match &self.fail_with {
            Some(msg) if self.fail_on.is_empty() || self.fail_on.contains(&call) => {
                Err(EmailError::Build(msg.clone()))
            }
            _ => Ok(()),
        }
    }
}

pub fn door(name: &str, pin: u8, open: bool) -> DoorStatus {
    DoorStatus {
        door: name.to_string(),
        open,
        gpio_pin: pin,
        last_changed_at: None,
    }
}

/// Garage (closed) and Front (open).
pub fn sample_board() -> DoorBoard {
    DoorBoard::new(vec![door("Garage", 17, false), door("Front", 27, true)])
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(board: DoorBoard, notifier: Arc<RecordingNotifier>) -> Router {
    let state = AppState { board, notifier };
    build_app_router(state, &test_config())
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
