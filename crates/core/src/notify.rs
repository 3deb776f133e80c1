use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::EmailConfig;
use crate::error::NotifyError;
use crate::model::Report;

pub trait Notifier {
    fn send(&self, report: &Report) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn compose(&self, report: &Report) -> Result<Message, NotifyError> {
        compose_message(&self.config, report)
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, report: &Report) -> Result<(), NotifyError> {
        let message = self.compose(report)?;
        if self.config.smtp_server.trim().is_empty() {
            return Err(NotifyError::MissingSetting("smtp_server"));
        }
        let mailer = SmtpTransport::starttls_relay(&self.config.smtp_server)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.smtp_user.clone(),
                self.config.smtp_pass.clone(),
            ))
            .build();
        mailer.send(&message)?;
        info!(
            server = %self.config.smtp_server,
            port = self.config.smtp_port,
            "alert email delivered"
        );
        Ok(())
    }
}

/// Writes the report to stderr instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn send(&self, report: &Report) -> Result<(), NotifyError> {
        eprintln!("Subject: {}\n\n{}", report.subject, report.body);
        Ok(())
    }
}

pub fn compose_message(config: &EmailConfig, report: &Report) -> Result<Message, NotifyError> {
    let recipients = config.recipients();
    if recipients.is_empty() {
        return Err(NotifyError::NoRecipients);
    }

    if config.from.trim().is_empty() {
        return Err(NotifyError::MissingSetting("email_from"));
    }

    let mut builder = Message::builder()
        .from(parse_mailbox(&config.from)?)
        .subject(report.subject.clone())
        .header(ContentType::TEXT_PLAIN);
    for address in recipients {
        builder = builder.to(parse_mailbox(address)?);
    }
    Ok(builder.body(report.body.clone())?)
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| NotifyError::Address {
            address: address.to_string(),
            source,
        })
}
