use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use doorwatch_core::config::{HomeConfig, MailConfig};
use doorwatch_core::door::STARTUP_SUBJECT;
use doorwatch_events::{EmailDelivery, HttpImageFetcher, ImageCapture, Notifier};
use doorwatch_monitor::pin::open_pins;
use doorwatch_monitor::{DoorBoard, DoorMonitor, MonitoredDoor};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doorwatch_api::config::{MonitorConfig, ServerConfig};
use doorwatch_api::router::build_app_router;
use doorwatch_api::state::AppState;

/// How long shutdown waits for the monitor to finish its sweep.
const MONITOR_STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "doorwatch_api=info,doorwatch_monitor=info,doorwatch_events=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let monitor_config = MonitorConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    let home = HomeConfig::load(&monitor_config.home_config_path)
        .unwrap_or_else(|e| fatal("Failed to load door configuration", e));
    let mail = MailConfig::load(&monitor_config.mail_config_path)
        .unwrap_or_else(|e| fatal("Failed to load mail configuration", e));
    tracing::info!(
        doors = home.doors.len(),
        recipients = mail.to.len(),
        smtp_server = %mail.smtp_server,
        "Loaded home and mail configuration",
    );
    for warning in home.warnings() {
        tracing::warn!(path = %monitor_config.home_config_path.display(), "{warning}");
    }

    // --- GPIO ---
    let pins: Vec<u8> = home.doors.iter().map(|door| door.gpio_pin).collect();
    let inputs = open_pins(&pins).unwrap_or_else(|e| fatal("Failed to initialise GPIO", e));

    // --- Delivery channels ---
    let notifier: Arc<dyn Notifier> = Arc::new(
        EmailDelivery::new(&mail, monitor_config.smtp_timeout)
            .unwrap_or_else(|e| fatal("Invalid mail configuration", e)),
    );
    let fetcher = Arc::new(
        HttpImageFetcher::new(monitor_config.fetch_timeout)
            .unwrap_or_else(|e| fatal("Failed to build camera HTTP client", e)),
    );
    let capture = ImageCapture::new(
        fetcher,
        &monitor_config.snapshot_dir,
        monitor_config.fetch_timeout,
    );

    // --- Monitor ---
    let board = DoorBoard::from_config(&home);
    let doors = home
        .doors
        .into_iter()
        .zip(inputs)
        .map(|(door, input)| MonitoredDoor::new(door, input))
        .collect();
    let monitor = DoorMonitor::new(
        doors,
        board.clone(),
        capture,
        Arc::clone(&notifier),
        monitor_config.poll_interval,
    );

    if let Err(e) = notifier.notify(STARTUP_SUBJECT, "", &[]).await {
        tracing::error!(error = %e, "Failed to send startup notification");
    }

    let monitor_cancel = CancellationToken::new();
    let monitor_handle = tokio::spawn(monitor.run(monitor_cancel.clone()));

    // --- App state ---
    let state = AppState { board, notifier };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host = config
        .host
        .parse()
        .unwrap_or_else(|e| fatal("Invalid HOST address", e));
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| fatal("Failed to bind to address", e));

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, stopping door monitor");

    monitor_cancel.cancel();
    match tokio::time::timeout(MONITOR_STOP_TIMEOUT, monitor_handle).await {
        Ok(Ok(())) => tracing::info!("Door monitor stopped"),
        Ok(Err(e)) => tracing::error!(error = %e, "Door monitor task failed"),
        Err(_) => tracing::warn!(
            timeout_secs = MONITOR_STOP_TIMEOUT.as_secs(),
            "Door monitor did not stop in time",
        ),
    }

    tracing::info!("Graceful shutdown complete");
}

/// Log a startup failure and exit with status 1.
fn fatal(context: &str, error: impl std::fmt::Display) -> ! {
    tracing::error!(error = %error, "{context}");
    eprintln!("{context}: {error}");
    std::process::exit(1)
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
