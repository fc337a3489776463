use amqprs::{
    callbacks::ChannelCallback, channel::Channel, Ack, BasicProperties, Cancel, CloseChannel, Nack,
    Return,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Notify;

pub struct ConsumerChannelCallback {
    consumer_cancelled_notify: Arc<Notify>,
}

impl ConsumerChannelCallback {
    pub fn new(consumer_cancelled_notify: Arc<Notify>) -> Self {
        Self {
            consumer_cancelled_notify,
        }
    }
}

#[async_trait]
impl ChannelCallback for ConsumerChannelCallback {
    #[tracing::instrument(
        name = "RabbitMQ Consumer Callback",
        target = "rabbitmq_client::consumer_callback",
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

        // consumer on a closed channel is as good as cancelled
        self.consumer_cancelled_notify.notify_one();

        Ok(())
    }

    #[tracing::instrument(
        name = "RabbitMQ Consumer Callback",
        target = "rabbitmq_client::consumer_callback",
        skip_all
    )]
    async fn cancel(
        &mut self,
        _channel: &Channel,
        _cancel: Cancel,
    ) -> Result<(), amqprs::error::Error> {
        tracing::error!("broker cancelled consumer");

        self.consumer_cancelled_notify.notify_one();

        Ok(())
    }

    async fn flow(
        &mut self,
        _channel: &Channel,
        active: bool,
    ) -> Result<bool, amqprs::error::Error> {
        Ok(active)
    }

    async fn publish_ack(&mut self, _channel: &Channel, _ack: Ack) {}

    async fn publish_nack(&mut self, _channel: &Channel, _nack: Nack) {}

    async fn publish_return(
        &mut self,
        _channel: &Channel,
        _ret: Return,
        _basic_properties: BasicProperties,
        _content: Vec<u8>,
    ) {
    }
}
