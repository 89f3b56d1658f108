//! Door and mail configuration files.
//!
//! Both files are JSON, read once at startup and immutable afterwards. A
//! missing, malformed or invalid file is fatal; the caller decides how to
//! report it.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::CoreError;

/// Snapshot count above which a door is reported by [`HomeConfig::warnings`];
/// every snapshot blocks the sweep.
pub const LARGE_IMAGE_COUNT: u32 = 50;

/// SMTP port that implies implicit TLS when no mode is configured.
const IMPLICIT_TLS_PORT: u16 = 465;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Invalid { path: PathBuf, source: CoreError },
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Door configuration
// ---------------------------------------------------------------------------

/// One monitored door contact.
#[derive(Debug, Clone, Deserialize)]
pub struct DoorConfig {
    /// Door name, unique within the monitored set.
    pub door: String,
    /// BCM GPIO number of the contact input.
    pub gpio_pin: u8,
    /// Camera snapshot URL template; may contain `{index}`.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_count: u32,
    #[serde(default)]
    pub image_delay_ms: u64,
    /// Level assumed before the first sweep (`false` = closed).
    #[serde(default)]
    pub open: bool,
    /// Treat a low input as open (active-low contacts).
    #[serde(default)]
    pub invert: bool,
}

impl DoorConfig {
    /// Image URL template, treating an empty string as unset.
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn image_delay(&self) -> Duration {
        Duration::from_millis(self.image_delay_ms)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.door.trim().is_empty() {
            return Err(CoreError::Validation("door name must not be empty".into()));
        }
        if let Some(url) = self.image_url() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CoreError::Validation(format!(
                    "door '{}': image_url must be an http(s) URL, got '{url}'",
                    self.door
                )));
            }
        }
        Ok(())
    }
}

/// The ordered set of monitored doors.
#[derive(Debug, Clone, Deserialize)]
pub struct HomeConfig {
    pub doors: Vec<DoorConfig>,
}

impl HomeConfig {
    /// Read, parse and validate the door configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config: Self = load_json(path)?;
        config.validate().map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Settings that load fine but are probably mistakes, one message each.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.doors.is_empty() {
            warnings.push("no doors configured; the monitor has nothing to watch".to_string());
        }
        for door in &self.doors {
            if door.image_count > LARGE_IMAGE_COUNT {
                warnings.push(format!(
                    "door '{}': image_count {} exceeds {LARGE_IMAGE_COUNT}; each snapshot delays the sweep",
                    door.door, door.image_count
                ));
            }
        }
        warnings
    }

    /// Check door names and pins are unique and every door is well-formed.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut names = HashSet::new();
        let mut pins = HashSet::new();
        for door in &self.doors {
            door.validate()?;
            if !names.insert(door.door.as_str()) {
                return Err(CoreError::Validation(format!(
                    "duplicate door name '{}'",
                    door.door
                )));
            }
            if !pins.insert(door.gpio_pin) {
                return Err(CoreError::Validation(format!(
                    "GPIO pin {} is assigned to more than one door",
                    door.gpio_pin
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Mail configuration
// ---------------------------------------------------------------------------

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// Plain connection upgraded with STARTTLS.
    Starttls,
    /// TLS from the first byte (SMTPS).
    Tls,
    /// No encryption. Only for local relays.
    None,
}

/// SMTP target and recipient list.
#[derive(Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Every notification goes to all of these addresses.
    pub to: Vec<String>,
    /// Sender address; defaults to `username`.
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub tls: Option<SmtpTls>,
}

impl MailConfig {
    /// Read, parse and validate the mail configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config: Self = load_json(path)?;
        config.validate().map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.smtp_server.trim().is_empty() {
            return Err(CoreError::Validation("smtp_server must not be empty".into()));
        }
        if self.smtp_port == 0 {
            return Err(CoreError::Validation("smtp_port must not be 0".into()));
        }
        if self.to.is_empty() {
            return Err(CoreError::Validation(
                "at least one recipient must be configured".into(),
            ));
        }
        if self.to.iter().any(|addr| addr.trim().is_empty()) {
            return Err(CoreError::Validation(
                "recipient addresses must not be empty".into(),
            ));
        }
        if self.from_address().trim().is_empty() {
            return Err(CoreError::Validation(
                "either from or username must be set".into(),
            ));
        }
        Ok(())
    }

    pub fn from_address(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }

    /// Configured TLS mode, or implicit TLS on port 465 and STARTTLS otherwise.
    pub fn tls_mode(&self) -> SmtpTls {
        self.tls.unwrap_or(if self.smtp_port == IMPLICIT_TLS_PORT {
            SmtpTls::Tls
        } else {
            SmtpTls::Starttls
        })
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("to", &self.to)
            .field("from", &self.from)
            .field("tls", &self.tls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const HOME_JSON: &str = r#"{
        "doors": [
            { "door": "Garage", "gpio_pin": 17, "image_url": "http://cam.local/snap.jpg",
              "image_count": 2, "image_delay_ms": 500 },
            { "door": "Front", "gpio_pin": 27 }
        ]
    }"#;

    const MAIL_JSON: &str = r#"{
        "smtp_server": "smtp.example.com",
        "smtp_port": 587,
        "username": "monitor@example.com",
        "password": "hunter2",
        "to": ["a@example.com", "b@example.com"]
    }"#;

    #[test]
    fn loads_home_config_in_order_with_defaults() {
        let file = write_temp(HOME_JSON);
        let config = HomeConfig::load(file.path()).unwrap();

        assert_eq!(config.doors.len(), 2);
        assert_eq!(config.doors[0].door, "Garage");
        assert_eq!(config.doors[0].image_count, 2);
        assert_eq!(config.doors[0].image_delay(), Duration::from_millis(500));

        let front = &config.doors[1];
        assert_eq!(front.door, "Front");
        assert_eq!(front.image_url(), None);
        assert_eq!(front.image_count, 0);
        assert!(!front.open);
        assert!(!front.invert);
    }

    #[test]
    fn empty_image_url_counts_as_unset() {
        let file = write_temp(
            r#"{ "doors": [ { "door": "Shed", "gpio_pin": 4, "image_url": "", "image_count": 3 } ] }"#,
        );
        let config = HomeConfig::load(file.path()).unwrap();
        assert_eq!(config.doors[0].image_url(), None);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HomeConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert_matches!(err, ConfigError::Read { .. });
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = write_temp("{ \"doors\": [ ");
        let err = HomeConfig::load(file.path()).unwrap_err();
        assert_matches!(err, ConfigError::Parse { .. });
    }

    #[test]
    fn duplicate_door_names_are_rejected() {
        let file = write_temp(
            r#"{ "doors": [ { "door": "Garage", "gpio_pin": 17 }, { "door": "Garage", "gpio_pin": 18 } ] }"#,
        );
        let err = HomeConfig::load(file.path()).unwrap_err();
        assert_matches!(
            err,
            ConfigError::Invalid { source: CoreError::Validation(msg), .. } if msg.contains("duplicate door name")
        );
    }

    #[test]
    fn shared_pins_are_rejected() {
        let file = write_temp(
            r#"{ "doors": [ { "door": "A", "gpio_pin": 17 }, { "door": "B", "gpio_pin": 17 } ] }"#,
        );
        assert_matches!(
            HomeConfig::load(file.path()),
            Err(ConfigError::Invalid { .. })
        );
    }

    #[test]
    fn large_image_count_loads_with_a_warning() {
        let file = write_temp(
            r#"{ "doors": [ { "door": "Garage", "gpio_pin": 17,
                              "image_url": "http://cam.local/snap.jpg", "image_count": 80 } ] }"#,
        );
        let config = HomeConfig::load(file.path()).unwrap();

        assert_eq!(config.doors[0].image_count, 80);
        let warnings = config.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Garage"));
        assert!(warnings[0].contains("80"));
    }

    #[test]
    fn non_http_image_url_is_rejected() {
        let file = write_temp(
            r#"{ "doors": [ { "door": "A", "gpio_pin": 5, "image_url": "ftp://cam/snap.jpg" } ] }"#,
        );
        assert_matches!(
            HomeConfig::load(file.path()),
            Err(ConfigError::Invalid { .. })
        );
    }

    #[test]
    fn empty_door_list_loads_with_a_warning() {
        let file = write_temp(r#"{ "doors": [] }"#);
        let config = HomeConfig::load(file.path()).unwrap();

        assert!(config.doors.is_empty());
        assert_eq!(config.warnings().len(), 1);
    }

    #[test]
    fn ordinary_config_has_no_warnings() {
        let file = write_temp(HOME_JSON);
        assert!(HomeConfig::load(file.path()).unwrap().warnings().is_empty());
    }

    #[test]
    fn loads_mail_config_with_derived_defaults() {
        let file = write_temp(MAIL_JSON);
        let config = MailConfig::load(file.path()).unwrap();

        assert_eq!(config.smtp_server, "smtp.example.com");
        assert_eq!(config.to.len(), 2);
        assert_eq!(config.from_address(), "monitor@example.com");
        assert_eq!(config.tls_mode(), SmtpTls::Starttls);
        assert!(config.has_credentials());
    }

    #[test]
    fn port_465_implies_implicit_tls() {
        let mut config: MailConfig = serde_json::from_str(MAIL_JSON).unwrap();
        config.smtp_port = 465;
        assert_eq!(config.tls_mode(), SmtpTls::Tls);

        config.tls = Some(SmtpTls::None);
        assert_eq!(config.tls_mode(), SmtpTls::None);
    }

    #[test]
    fn mail_config_without_recipients_is_rejected() {
        let file = write_temp(
            r#"{ "smtp_server": "smtp.example.com", "smtp_port": 587, "username": "u@example.com", "to": [] }"#,
        );
        assert_matches!(
            MailConfig::load(file.path()),
            Err(ConfigError::Invalid { .. })
        );
    }

    #[test]
    fn debug_output_redacts_password() {
        let config: MailConfig = serde_json::from_str(MAIL_JSON).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
