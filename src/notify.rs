//! E-mail delivery of update reports

#[cfg(test)]
use mockall::automock;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::{AuthMechanism, EmailConfig};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid e-mail address {address:?}: {reason}")]
    Address { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Trait for delivering a rendered HTML report
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, html_body: &str) -> Result<(), NotifyError>;
}

/// Notifier sending the report through the sender's SMTP server
pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let (username, host) = split_sender(&self.config.sender_email)?;

        let builder = match self.config.auth_mechanism {
            AuthMechanism::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
            AuthMechanism::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
            AuthMechanism::Plain => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };

        Ok(builder
            .port(self.config.email_port)
            .credentials(Credentials::new(
                username.to_string(),
                self.config.sender_password.clone(),
            ))
            .build())
    }
}

#[async_trait::async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, html_body: &str) -> Result<(), NotifyError> {
        let message = build_message(&self.config, html_body, Local::now())?;
        let transport = self.transport()?;

        transport.send(message).await?;
        info!("Sent update report to {}", self.config.recipient);
        Ok(())
    }
}

/// Split a sender address into the SMTP login and the server host.
///
/// The server is the domain of the sender address and the login is its
/// local part.
pub fn split_sender(sender: &str) -> Result<(&str, &str), NotifyError> {
    match sender.split_once('@') {
        Some((user, host)) if !user.is_empty() && !host.is_empty() => Ok((user, host)),
        _ => Err(NotifyError::Address {
            address: sender.to_string(),
            reason: "expected user@host".to_string(),
        }),
    }
}

/// Render the subject line from a strftime pattern.
///
/// A pattern chrono cannot interpret is used verbatim.
pub fn render_subject(title_format: &str, now: DateTime<Local>) -> String {
    if StrftimeItems::new(title_format).any(|item| matches!(item, Item::Error)) {
        return title_format.to_string();
    }
    now.format(title_format).to_string()
}

/// Build the HTML e-mail for a report
pub fn build_message(
    config: &EmailConfig,
    html_body: &str,
    now: DateTime<Local>,
) -> Result<Message, NotifyError> {
    Ok(Message::builder()
        .subject(render_subject(&config.title_format, now))
        .from(parse_mailbox(&config.sender_email)?)
        .to(parse_mailbox(&config.recipient)?)
        .header(ContentType::TEXT_HTML)
        .body(html_body.to_string())?)
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|e: lettre::address::AddressError| NotifyError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}
