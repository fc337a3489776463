use super::{EmailSender, Error, SmtpEmailSenderConfig};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpEmailSender {
    pub fn new(config: SmtpEmailSenderConfig) -> Result<Self, Error> {
        let sender = config.sender.parse::<Mailbox>()?;

        let builder = match config.tls {
            true => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            false => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };
        let builder = builder.port(config.port);
        let builder = match config.credentials {
            Some((username, password)) => builder.credentials(Credentials::new(username, password)),
            None => builder,
        };

        Ok(Self {
            transport: builder.build(),
            sender,
        })
    }

    fn message(&self, to: &str, subject: &str, html_body: String) -> Result<Message, Error> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(to.parse::<Mailbox>()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)?;

        Ok(message)
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, to: &str, subject: &str, html_body: String) -> Result<(), Error> {
        let message = self.message(to, subject, html_body)?;

        let response = self.transport.send(message).await?;
        tracing::debug!(code = %response.code(), "smtp accepted message");

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config(sender: &str) -> SmtpEmailSenderConfig {
        SmtpEmailSenderConfig {
            host: "localhost".to_string(),
            port: 1025,
            tls: false,
            credentials: None,
            sender: sender.to_string(),
        }
    }

    #[test]
    fn new_invalid_sender() {
        let result = SmtpEmailSender::new(config("not an address"));

        assert!(matches!(result, Err(Error::Address(_))));
    }

    #[tokio::test]
    async fn message_headers() {
        let sender = SmtpEmailSender::new(config("Teamboard <no-reply@teamboard.local>")).unwrap();

        let message = sender
            .message(
                "alice@example.com",
                "Welcome to Team Core",
                "<p>Hi</p>".to_string(),
            )
            .unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("From: Teamboard <no-reply@teamboard.local>"));
        assert!(formatted.contains("To: alice@example.com"));
        assert!(formatted.contains("Subject: Welcome to Team Core"));
        assert!(formatted.contains("Content-Type: text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn send_invalid_recipient() {
        let sender = SmtpEmailSender::new(config("no-reply@teamboard.local")).unwrap();

        let result = sender
            .send("definitely not an address", "Subject", String::new())
            .await;

        assert!(matches!(result, Err(Error::Address(_))));
    }
}
