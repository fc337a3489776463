use super::{EmailJobHandler, EmailJobsConsumerServiceConfig};
use crate::service::email_sender::{EmailSender, EmailTemplates};
use async_trait::async_trait;
use email_jobs::EMAIL_QUEUE;
use rabbitmq_client::{
    RabbitmqConnection, RabbitmqConsumerStatus, RabbitmqConsumerStatusChangeCallback,
    RabbitmqQueueConsumer, RabbitmqQueueConsumerConfig,
};
use std::sync::Arc;
use uuid::Uuid;

///
/// Consumes email jobs queue one job at a time
///
pub struct EmailJobsConsumerService {
    rabbitmq_consumer: RabbitmqQueueConsumer,
}

impl EmailJobsConsumerService {
    pub async fn new(
        config: EmailJobsConsumerServiceConfig,
        rabbitmq_connection: RabbitmqConnection,
        templates: Arc<EmailTemplates>,
        email_sender: Arc<dyn EmailSender>,
    ) -> anyhow::Result<Self> {
        let consumer_config = RabbitmqQueueConsumerConfig {
            queue: EMAIL_QUEUE.to_string(),
            consumer_tag: format!("teamboard-worker-{}", Uuid::new_v4().simple()),
            prefetch_count: 1,
            redelivery_delay: config.redelivery_delay,
        };
        let handler = EmailJobHandler::new(templates, email_sender);

        let rabbitmq_consumer = RabbitmqQueueConsumer::new(
            rabbitmq_connection,
            consumer_config,
            Arc::new(handler),
            StatusCallback,
        )
        .await?;

        Ok(Self { rabbitmq_consumer })
    }

    pub async fn close(self) {
        self.rabbitmq_consumer.close().await;
    }
}

struct StatusCallback;

#[async_trait]
impl RabbitmqConsumerStatusChangeCallback for StatusCallback {
    async fn execute(&self, status: RabbitmqConsumerStatus) {
        match status {
            RabbitmqConsumerStatus::Consuming => tracing::info!("consuming email jobs"),
            RabbitmqConsumerStatus::Recovering => {
                tracing::warn!("email jobs consumer is recovering")
            }
        }
    }
}
