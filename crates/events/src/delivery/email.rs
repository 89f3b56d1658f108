//! Email notification delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send HTML
//! notifications with optional snapshot attachments. Every message goes to
//! the full recipient list from the mail configuration. Delivery is a single
//! attempt bounded by a timeout; there is no retry and no queue.

use std::path::{Path, PathBuf};
use std::time::Duration;

use doorwatch_core::config::{MailConfig, SmtpTls};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    #[error("SMTP send timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Transport capability: deliver one notification.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Send `subject` with an HTML body and the given files attached.
    async fn notify(
        &self,
        subject: &str,
        body_html: &str,
        attachments: &[PathBuf],
    ) -> Result<(), EmailError>;
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends door notifications via SMTP.
#[derive(Debug)]
pub struct EmailDelivery {
    from: Mailbox,
    recipients: Vec<Mailbox>,
    transport: AsyncSmtpTransport<Tokio1Executor>,
    send_timeout: Duration,
}

impl EmailDelivery {
    /// Create a delivery service from the mail configuration.
    ///
    /// Fails on an unparseable sender or recipient address. No connection
    /// is opened until the first send.
    pub fn new(config: &MailConfig, send_timeout: Duration) -> Result<Self, EmailError> {
        let from: Mailbox = config.from_address().parse()?;
        let recipients = config
            .to
            .iter()
            .map(|addr| addr.trim().parse::<Mailbox>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = match config.tls_mode() {
            SmtpTls::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)?
            }
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_server)?,
            SmtpTls::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_server)
            }
        }
        .port(config.smtp_port)
        .timeout(Some(send_timeout));

        if config.has_credentials() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            from,
            recipients,
            transport: builder.build(),
            send_timeout,
        })
    }

    /// Assemble the MIME message: one HTML part plus one part per readable
    /// attachment. Unreadable attachments are logged and left out.
    pub async fn build_message(
        &self,
        subject: &str,
        body_html: &str,
        attachments: &[PathBuf],
    ) -> Result<Message, EmailError> {
        let mut builder = Message::builder().from(self.from.clone()).subject(subject);
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(body_html.to_string()));

        for path in attachments {
            let bytes = match tokio::fs::read(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable attachment");
                    continue;
                }
            };
            let content_type = ContentType::parse(attachment_mime(path))
                .map_err(|e| EmailError::Build(e.to_string()))?;
            body = body.singlepart(Attachment::new(attachment_name(path)).body(bytes, content_type));
        }

        builder
            .multipart(body)
            .map_err(|e| EmailError::Build(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Notifier for EmailDelivery {
    async fn notify(
        &self,
        subject: &str,
        body_html: &str,
        attachments: &[PathBuf],
    ) -> Result<(), EmailError> {
        let email = self.build_message(subject, body_html, attachments).await?;

        tokio::time::timeout(self.send_timeout, self.transport.send(email))
            .await
            .map_err(|_| EmailError::Timeout(self.send_timeout))??;

        tracing::info!(
            recipients = self.recipients.len(),
            attachments = attachments.len(),
            subject,
            "Notification email sent",
        );
        Ok(())
    }
}

/// File name shown to the recipient for an attached snapshot.
fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot.jpg".to_string())
}

/// MIME type guessed from the file extension.
fn attachment_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
