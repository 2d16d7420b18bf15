use crate::config::EmailConfig;
use crate::ports::email_service::{EmailService as EmailServiceTrait, Result};
use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

/// Subject line of every message sent by the library
pub const MAIL_SUBJECT: &str = "My Library";

/// SMTP implementation of EmailService
///
/// Sends one plain-text message addressed to every recipient.
#[derive(Clone)]
pub struct EmailService {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from: Mailbox = config.smtp_from.parse()?;

        let builder = if config.smtp_use_tls {
            SmtpTransport::starttls_relay(&config.smtp_host)?
        } else {
            SmtpTransport::builder_dangerous(&config.smtp_host)
        }
        .port(config.smtp_port);

        let builder = match (&config.smtp_username, &config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    fn build_message(&self, recipients: &[String], message: &str) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(MAIL_SUBJECT)
            .header(ContentType::TEXT_PLAIN);

        for recipient in recipients {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }

        Ok(builder.body(message.to_string())?)
    }
}

#[async_trait]
impl EmailServiceTrait for EmailService {
    async fn send_emails(&self, recipients: &[String], message: &str) -> Result<()> {
        let email = self.build_message(recipients, message)?;
        let mailer = self.mailer.clone();

        // SmtpTransport is blocking
        tokio::task::spawn_blocking(move || mailer.send(&email)).await??;

        Ok(())
    }
}
