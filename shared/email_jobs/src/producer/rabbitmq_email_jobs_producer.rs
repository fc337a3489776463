use super::EmailJobsProducer;
use crate::{EmailJob, EmailJobsError, EMAIL_QUEUE};
use async_trait::async_trait;
use rabbitmq_client::{RabbitmqConnection, RabbitmqQueuePublisher, RabbitmqQueuePublisherConfig};
use std::time::Duration;

pub struct RabbitmqEmailJobsProducer {
    publisher: RabbitmqQueuePublisher,
}

impl RabbitmqEmailJobsProducer {
    pub fn new(rabbitmq_connection: RabbitmqConnection, publish_timeout: Duration) -> Self {
        let config = RabbitmqQueuePublisherConfig {
            queue: EMAIL_QUEUE.to_string(),
            publish_timeout,
        };

        Self {
            publisher: RabbitmqQueuePublisher::new(config, rabbitmq_connection),
        }
    }

    pub async fn close(self) {
        self.publisher.close().await;
    }
}

#[async_trait]
impl EmailJobsProducer for RabbitmqEmailJobsProducer {
    #[tracing::instrument(
        name = "Email Jobs Producer",
        target = "email_jobs::producer",
        skip_all,
        fields(template = %job.template_name)
    )]
    async fn publish(&self, job: EmailJob) -> Result<(), EmailJobsError> {
        let content = serde_json::to_vec(&job)?;
        self.publisher.publish("application/json", content).await?;

        tracing::debug!("email job enqueued");

        Ok(())
    }
}
