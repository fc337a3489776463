use super::{
    dto::{PublisherConfirm, PublisherConfirmVariant},
    publisher_channel_callback::PublisherChannelCallback,
    PublishError,
};
use amqprs::{
    channel::{BasicPublishArguments, Channel, ConfirmSelectArguments, QueueDeclareArguments},
    connection::Connection,
    BasicProperties,
};
use tokio::sync::mpsc;

///
/// Channel in confirm mode with the queue already declared.
/// Used by one publish at a time, so delivery tags grow by one per message.
///
pub struct PublisherChannel {
    channel: Channel,
    confirms_rx: mpsc::UnboundedReceiver<PublisherConfirm>,
    last_delivery_tag: u64,
}

impl PublisherChannel {
    pub async fn open(connection: &Connection, queue: &str) -> Result<Self, PublishError> {
        tracing::debug!("opening publisher channel");
        let channel = connection.open_channel(None).await?;

        let (confirms_tx, confirms_rx) = mpsc::unbounded_channel();
        channel
            .register_callback(PublisherChannelCallback::new(confirms_tx))
            .await?;

        let queue_declare_args = QueueDeclareArguments::new(queue).durable(true).finish();
        channel.queue_declare(queue_declare_args).await?;

        channel
            .confirm_select(ConfirmSelectArguments::new(false))
            .await?;

        tracing::debug!("publisher channel opened");

        Ok(Self {
            channel,
            confirms_rx,
            last_delivery_tag: 0,
        })
    }

    pub fn is_open(&self) -> bool {
        self.channel.is_open()
    }

    pub async fn publish(
        &mut self,
        queue: &str,
        basic_properties: BasicProperties,
        content: Vec<u8>,
    ) -> Result<(), PublishError> {
        let args = BasicPublishArguments::new("", queue);
        self.channel
            .basic_publish(basic_properties, content, args)
            .await?;
        self.last_delivery_tag += 1;

        let delivery_tag = self.last_delivery_tag;
        tracing::trace!(delivery_tag, "waiting for publisher confirm");

        self.wait_for_confirm(delivery_tag).await
    }

    async fn wait_for_confirm(&mut self, delivery_tag: u64) -> Result<(), PublishError> {
        loop {
            let Some(confirm) = self.confirms_rx.recv().await else {
                return Err(PublishError::ChannelClosed);
            };

            if !confirm.covers(delivery_tag) {
                continue;
            }

            return match confirm.variant {
                PublisherConfirmVariant::Ack => Ok(()),
                PublisherConfirmVariant::Nack => Err(PublishError::Nacked),
            };
        }
    }

    pub async fn close(self) {
        if let Err(err) = self.channel.close().await {
            tracing::debug!(%err, "failed to close publisher channel");
        }
    }
}
