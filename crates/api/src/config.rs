use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use doorwatch_monitor::monitor::DEFAULT_POLL_INTERVAL;

/// HTTP server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `8080`    |
    /// | `REQUEST_TIMEOUT_SECS` | `60`      |
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 8080),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 60),
        }
    }
}

/// Monitor wiring: config file locations, polling cadence and the timeouts
/// applied to camera and SMTP calls.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub home_config_path: PathBuf,
    pub mail_config_path: PathBuf,
    pub poll_interval: Duration,
    pub snapshot_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub smtp_timeout: Duration,
}

impl MonitorConfig {
    /// | Env Var              | Default         |
    /// |----------------------|-----------------|
    /// | `HOME_CONFIG_PATH`   | `./home.json`   |
    /// | `MAIL_CONFIG_PATH`   | `./email.json`  |
    /// | `POLL_INTERVAL_MS`   | `5000`          |
    /// | `SNAPSHOT_DIR`       | `./snapshots`   |
    /// | `FETCH_TIMEOUT_SECS` | `10`            |
    /// | `SMTP_TIMEOUT_SECS`  | `20`            |
    pub fn from_env() -> Self {
        let default_poll_ms = DEFAULT_POLL_INTERVAL.as_millis() as u64;

        Self {
            home_config_path: path_or("HOME_CONFIG_PATH", "./home.json"),
            mail_config_path: path_or("MAIL_CONFIG_PATH", "./email.json"),
            poll_interval: Duration::from_millis(env_or("POLL_INTERVAL_MS", default_poll_ms)),
            snapshot_dir: path_or("SNAPSHOT_DIR", "./snapshots"),
            fetch_timeout: Duration::from_secs(env_or("FETCH_TIMEOUT_SECS", 10)),
            smtp_timeout: Duration::from_secs(env_or("SMTP_TIMEOUT_SECS", 20)),
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset
/// or unparseable.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, value = %raw, error = %e, %default, "Invalid env value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn path_or(key: &str, default: &str) -> PathBuf {
    std::env::var_os(key)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
