/// SMTP email sending implementation
use super::{EmailError, EmailResult, Mailer, OutgoingEmail};
use crate::app_config::EmailConfig;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Mailer backed by a pooled async SMTP transport.
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> EmailResult<Self> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
            .parse()
            .map_err(|e| EmailError::ConfigError(format!("Invalid from address: {}", e)))?;

        let builder = if config.smtp_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };

        let builder = if config.smtp_username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
        };

        Ok(Self {
            from,
            transport: builder.port(config.smtp_port).build(),
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> EmailResult<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject.as_str());

        for to in &email.to {
            builder = builder.to(parse_mailbox(to)?);
        }
        for bcc in &email.bcc {
            builder = builder.bcc(parse_mailbox(bcc)?);
        }

        // Add body (either plain text only, or multipart with HTML)
        let message = if let Some(html) = &email.body_html {
            builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.body_text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.clone()),
                    ),
            )?
        } else {
            builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.body_text.clone())?
        };

        Ok(message)
    }
}

fn parse_mailbox(address: &str) -> EmailResult<Mailbox> {
    address
        .parse()
        .map_err(|e| EmailError::ConfigError(format!("Invalid address {}: {}", address, e)))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> EmailResult<()> {
        let message = self.build_message(&email)?;
        self.transport.send(message).await?;

        log::info!(
            "Email \"{}\" sent to {} recipient(s)",
            email.subject,
            email.recipient_count()
        );

        Ok(())
    }
}
