//! Delivery of reviewer notifications.
//!
//! With an `smtp` section in the settings messages go out through the
//! `lettre` async SMTP transport; without one they are only logged, which is
//! what local development runs with.

use lettre::address::AddressError;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::notification::{MailError, Mailer, OutgoingEmail};
use crate::infrastructure::settings::SmtpSettings;

#[derive(Clone)]
pub enum MailerAdapter {
    Smtp(SmtpMailer),
    Log,
}

impl MailerAdapter {
    pub fn from_settings(settings: Option<&SmtpSettings>) -> Result<Self, MailError> {
        match settings {
            Some(smtp) => Ok(MailerAdapter::Smtp(SmtpMailer::new(smtp)?)),
            None => {
                tracing::warn!("no smtp settings, notifications are only logged");
                Ok(MailerAdapter::Log)
            }
        }
    }
}

impl Mailer for MailerAdapter {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        match self {
            MailerAdapter::Smtp(mailer) => mailer.send(email).await,
            MailerAdapter::Log => {
                tracing::info!(
                    to = ?email.to,
                    subject = %email.subject,
                    "notification not sent, no smtp transport configured"
                );
                Ok(())
            }
        }
    }
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(settings.port);

        if let (Some(user), Some(password)) = (&settings.user, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let recipients = email.to.len();
        let message = message(&email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!(recipients, subject = %email.subject, "notification e-mail sent");
        Ok(())
    }
}

/// Plain text message with every recipient in `To`
fn message(email: &OutgoingEmail) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(mailbox(&email.from)?)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN);
    for to in &email.to {
        builder = builder.to(mailbox(to)?);
    }

    builder
        .body(email.body.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|e: AddressError| MailError::Address(format!("{}: {}", address, e)))
}
