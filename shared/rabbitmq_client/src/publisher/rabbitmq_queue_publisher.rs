use super::{dto::RabbitmqQueuePublisherConfig, publisher_channel::PublisherChannel, PublishError};
use crate::RabbitmqConnection;
use amqprs::BasicProperties;
use tokio::sync::{watch, Mutex};

///
/// Publishes persistent messages to a durable queue and waits for broker confirmation.
///
/// The channel is opened lazily and reopened after any failure,
/// so a publish after a reconnect of [RabbitmqConnection] works again.
/// Publishes are serialized because a channel is not safe for concurrent publishers.
///
pub struct RabbitmqQueuePublisher {
    config: RabbitmqQueuePublisherConfig,
    rabbitmq_connection: RabbitmqConnection,

    channel: Mutex<Option<PublisherChannel>>,
}

impl RabbitmqQueuePublisher {
    pub fn new(config: RabbitmqQueuePublisherConfig, rabbitmq_connection: RabbitmqConnection) -> Self {
        Self {
            config,
            rabbitmq_connection,
            channel: Mutex::new(None),
        }
    }

    pub fn queue(&self) -> &str {
        &self.config.queue
    }

    ///
    /// Publishes message as persistent with given content type.
    /// The whole publish is bounded by `publish_timeout`.
    ///
    /// ### Errors
    /// - [PublishError::ConnectionUnavailable] when connection is being restored
    /// - [PublishError::ConnectionBlocked] when broker refuses published messages
    /// - [PublishError::Nacked] when broker refused the message
    /// - [PublishError::Timeout] when publish didn't finish in time
    /// - [PublishError::Amqp] and [PublishError::ChannelClosed] on channel failures
    ///
    #[tracing::instrument(
        name = "RabbitMQ Publisher",
        target = "rabbitmq_client::publisher",
        skip_all,
        fields(queue = %self.config.queue)
    )]
    pub async fn publish(&self, content_type: &str, content: Vec<u8>) -> Result<(), PublishError> {
        let timeout = self.config.publish_timeout;
        let result = tokio::time::timeout(timeout, self.publish_serialized(content_type, content))
            .await
            .unwrap_or(Err(PublishError::Timeout(timeout)));

        if let Err(PublishError::Timeout(_)) = result {
            // channel taken by the abandoned publish is dropped with it
            tracing::warn!(?timeout, "publish timed out");
        }

        result
    }

    async fn publish_serialized(
        &self,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<(), PublishError> {
        let connection = current_connection(
            &self.rabbitmq_connection.connection(),
            &self.rabbitmq_connection.blocked_reason(),
        )?;

        let mut channel_lock = self.channel.lock().await;

        let mut channel = match channel_lock.take() {
            Some(channel) if channel.is_open() => channel,
            _ => PublisherChannel::open(&connection, &self.config.queue).await?,
        };

        let basic_properties = BasicProperties::default()
            .with_content_type(content_type)
            .with_persistence(true)
            .finish();

        let result = channel
            .publish(&self.config.queue, basic_properties, content)
            .await;

        match result {
            Ok(()) => {
                tracing::debug!("message confirmed");
                *channel_lock = Some(channel);
            }
            // Nack does not break the channel
            Err(PublishError::Nacked) => {
                tracing::warn!("message nacked");
                *channel_lock = Some(channel);
            }
            Err(ref err) => {
                tracing::warn!(%err, "publish failed, dropping channel");
                channel.close().await;
            }
        }

        result
    }

    pub async fn close(self) {
        tracing::info!("closing publisher");

        if let Some(channel) = self.channel.into_inner() {
            channel.close().await;
        }

        tracing::info!("publisher closed");
    }
}

///
/// Connection to publish with, checked before touching the channel
/// so a blocked broker fails the publish right away
///
fn current_connection<C: Clone>(
    connection_rx: &watch::Receiver<Option<C>>,
    blocked_reason_rx: &watch::Receiver<Option<String>>,
) -> Result<C, PublishError> {
    if let Some(reason) = blocked_reason_rx.borrow().as_ref() {
        return Err(PublishError::ConnectionBlocked(reason.clone()));
    }

    connection_rx
        .borrow()
        .clone()
        .ok_or(PublishError::ConnectionUnavailable)
}
