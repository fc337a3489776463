use super::dto::{PublisherConfirm, PublisherConfirmVariant};
use amqprs::{channel::Channel, Ack, BasicProperties, Cancel, CloseChannel, Nack, Return};
use async_trait::async_trait;
use tokio::sync::mpsc;

///
/// Forwards publisher confirms to the channel owner
///
pub struct PublisherChannelCallback {
    confirms_tx: mpsc::UnboundedSender<PublisherConfirm>,
}

impl PublisherChannelCallback {
    pub fn new(confirms_tx: mpsc::UnboundedSender<PublisherConfirm>) -> Self {
        Self { confirms_tx }
    }

    fn forward(&self, confirm: PublisherConfirm) {
        if self.confirms_tx.send(confirm).is_err() {
            tracing::debug!(
                delivery_tag = confirm.delivery_tag,
                "confirm received after channel was dropped"
            );
        }
    }
}

#[async_trait]
impl amqprs::callbacks::ChannelCallback for PublisherChannelCallback {
    #[tracing::instrument(
        name = "RabbitMQ Publisher Callback",
        target = "rabbitmq_client::publisher_callback",
        skip_all
    )]
    async fn close(
        &mut self,
        _channel: &Channel,
        close: CloseChannel,
    ) -> Result<(), amqprs::error::Error> {
        tracing::error!(
            code = close.reply_code(),
            text = close.reply_text(),
            "broker closed channel",
        );

        Ok(())
    }

    async fn cancel(
        &mut self,
        _channel: &Channel,
        _cancel: Cancel,
    ) -> Result<(), amqprs::error::Error> {
        // NOP channel is not used for consuming
        Ok(())
    }

    async fn flow(
        &mut self,
        _channel: &Channel,
        active: bool,
    ) -> Result<bool, amqprs::error::Error> {
        tracing::debug!(active, "received flow");

        Ok(active)
    }

    async fn publish_ack(&mut self, _channel: &Channel, ack: Ack) {
        tracing::trace!(delivery_tag = ack.delivery_tag(), "received ack");

        self.forward(PublisherConfirm {
            delivery_tag: ack.delivery_tag(),
            multiple: ack.mutiple(),
            variant: PublisherConfirmVariant::Ack,
        });
    }

    async fn publish_nack(&mut self, _channel: &Channel, nack: Nack) {
        tracing::trace!(delivery_tag = nack.delivery_tag(), "received nack");

        self.forward(PublisherConfirm {
            delivery_tag: nack.delivery_tag(),
            multiple: nack.multiple(),
            variant: PublisherConfirmVariant::Nack,
        });
    }

    async fn publish_return(
        &mut self,
        _channel: &Channel,
        _ret: Return,
        _basic_properties: BasicProperties,
        _content: Vec<u8>,
    ) {
        // NOP messages are published without mandatory flag
    }
}
