use crate::service::email_sender::{EmailSender, EmailTemplates};
use anyhow::Context;
use async_trait::async_trait;
use email_jobs::EmailJob;
use rabbitmq_client::{DeliveryHandler, HandlerError};
use std::sync::Arc;

///
/// Renders and sends a single [EmailJob].
///
/// Every failure, including malformed payloads, is returned to the consumer
/// so the job is requeued. Sending the same job twice only duplicates the email.
///
pub struct EmailJobHandler {
    templates: Arc<EmailTemplates>,
    email_sender: Arc<dyn EmailSender>,
}

impl EmailJobHandler {
    pub fn new(templates: Arc<EmailTemplates>, email_sender: Arc<dyn EmailSender>) -> Self {
        Self {
            templates,
            email_sender,
        }
    }
}

#[async_trait]
impl DeliveryHandler for EmailJobHandler {
    async fn handle(&self, content: &[u8]) -> Result<(), HandlerError> {
        let job = serde_json::from_slice::<EmailJob>(content).context("invalid email job")?;
        tracing::info!(template = %job.template_name, "sending email");

        let html_body = self
            .templates
            .render(&job.template_name, &job.data)
            .with_context(|| format!("failed to render '{}'", job.template_name))?;

        self.email_sender
            .send(&job.to, &job.subject, html_body)
            .await
            .context("failed to send email")?;

        tracing::info!("email sent");

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::service::email_sender::{Error, MockEmailSender};
    use mockall::predicate;
    use serde_json::json;
    use std::path::Path;

    fn templates() -> Arc<EmailTemplates> {
        let directory = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates/emails");
        Arc::new(EmailTemplates::load(&directory).unwrap())
    }

    fn team_join_job() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "to": "alice@example.com",
            "subject": "Welcome to Team Core",
            "template_name": "team_join.html",
            "data": { "user_name": "Alice", "team_name": "Core" },
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn handle_sends_rendered_email() {
        let mut email_sender = MockEmailSender::new();
        email_sender
            .expect_send()
            .with(
                predicate::eq("alice@example.com"),
                predicate::eq("Welcome to Team Core"),
                predicate::function(|body: &String| {
                    body.contains("Alice") && body.contains("Core")
                }),
            )
            .times(1)
            .returning(|_, _, _| Ok(()));

        let handler = EmailJobHandler::new(templates(), Arc::new(email_sender));

        let result = handler.handle(&team_join_job()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn handle_send_failure() {
        let mut email_sender = MockEmailSender::new();
        email_sender
            .expect_send()
            .times(1)
            .returning(|_, _, _| {
                let err = "invalid".parse::<lettre::Address>().unwrap_err();
                Err(Error::Address(err))
            });

        let handler = EmailJobHandler::new(templates(), Arc::new(email_sender));

        let result = handler.handle(&team_join_job()).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn handle_invalid_payload() {
        let mut email_sender = MockEmailSender::new();
        email_sender.expect_send().never();

        let handler = EmailJobHandler::new(templates(), Arc::new(email_sender));

        let result = handler.handle(b"{\"to\": 17}").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn handle_unknown_template() {
        let mut email_sender = MockEmailSender::new();
        email_sender.expect_send().never();

        let handler = EmailJobHandler::new(templates(), Arc::new(email_sender));
        let content = serde_json::to_vec(&json!({
            "to": "alice@example.com",
            "subject": "Hello",
            "template_name": "newsletter.html",
            "data": {},
        }))
        .unwrap();

        let result = handler.handle(&content).await;

        assert!(result.is_err());
    }
}
