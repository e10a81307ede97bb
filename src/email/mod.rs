/// Email sending functionality
///
/// Handlers and background tasks hand an [`OutgoingEmail`] to a [`Mailer`].
/// The SMTP implementation lives in [`smtp`]; [`MockMailer`] logs and records
/// messages instead of sending them, for development and tests.

pub mod smtp;
pub mod templates;

use crate::app_config::EmailConfig;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Email sending result
pub type EmailResult<T> = Result<T, EmailError>;

/// Email errors
#[derive(Debug)]
pub enum EmailError {
    /// SMTP configuration or address error
    ConfigError(String),
    /// Email building error
    BuildError(lettre::error::Error),
    /// Email sending error
    SendError(lettre::transport::smtp::Error),
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailError::ConfigError(msg) => write!(f, "Email config error: {}", msg),
            EmailError::BuildError(e) => write!(f, "Email build error: {}", e),
            EmailError::SendError(e) => write!(f, "Email send error: {}", e),
        }
    }
}

impl std::error::Error for EmailError {}

impl From<lettre::error::Error> for EmailError {
    fn from(e: lettre::error::Error) -> Self {
        EmailError::BuildError(e)
    }
}

impl From<lettre::transport::smtp::Error> for EmailError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        EmailError::SendError(e)
    }
}

/// A message ready to hand to a [`Mailer`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    /// Blind copies. Never rendered into the headers other recipients see.
    pub bcc: Vec<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
}

impl OutgoingEmail {
    /// Plain text message to a single recipient.
    pub fn plain(to: &str, subject: &str, body_text: &str) -> Self {
        Self {
            to: vec![to.to_owned()],
            subject: subject.to_owned(),
            body_text: body_text.to_owned(),
            ..Default::default()
        }
    }

    /// Every address this message will be delivered to.
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.bcc.len()
    }
}

/// Delivers outgoing email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> EmailResult<()>;
}

/// Mailer that logs messages and keeps them in memory.
#[derive(Debug, Default)]
pub struct MockMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails, for exercising error paths.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: OutgoingEmail) -> EmailResult<()> {
        if self.fail {
            return Err(EmailError::ConfigError(
                "mock transport rejected the message".to_string(),
            ));
        }

        log::info!("MOCK EMAIL:");
        log::info!("  To: {}", email.to.join(", "));
        if !email.bcc.is_empty() {
            log::info!("  Bcc: {} recipient(s)", email.bcc.len());
        }
        log::info!("  Subject: {}", email.subject);
        log::info!("  Body: {}", email.body_text);

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}

/// Builds the mailer selected by configuration.
pub fn build_mailer(config: &EmailConfig) -> EmailResult<Arc<dyn Mailer>> {
    if config.mock {
        log::warn!("Email mock mode is enabled; messages will only be logged.");
        return Ok(Arc::new(MockMailer::new()));
    }

    Ok(Arc::new(smtp::SmtpMailer::new(config)?))
}
