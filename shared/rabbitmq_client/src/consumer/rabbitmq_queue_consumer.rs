use super::{
    consumer_channel_callback::ConsumerChannelCallback,
    delivery::QueueDeliveryConsumer,
    state_machine::{start_consuming, ConsumerStateMachine},
    DeliveryHandler, RabbitmqConsumerStatusChangeCallback, RabbitmqQueueConsumerConfig,
};
use crate::RabbitmqConnection;
use std::sync::Arc;
use tokio::{sync::Notify, task::JoinHandle};

///
/// Consumes durable queue with manual acknowledgement.
///
/// Every delivery is passed to [DeliveryHandler]. Successful deliveries are acked,
/// failed ones are nacked with requeue after `redelivery_delay`, so they are retried until they succeed.
/// Channel and consumer are restored in background after connection or channel failure.
///
pub struct RabbitmqQueueConsumer {
    task_handle: JoinHandle<()>,

    close_notify: Arc<Notify>,
}

impl RabbitmqQueueConsumer {
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all,
        fields(queue = %config.queue)
    )]
    pub async fn new<Handler, StatusCallback>(
        rabbitmq_connection: RabbitmqConnection,
        config: RabbitmqQueueConsumerConfig,
        handler: Arc<Handler>,
        status_callback: StatusCallback,
    ) -> anyhow::Result<Self>
    where
        Handler: DeliveryHandler,
        StatusCallback: RabbitmqConsumerStatusChangeCallback,
    {
        tracing::info!("starting consumer");

        let mut connection_rx = rabbitmq_connection.connection();
        let Some(connection) = connection_rx.borrow_and_update().clone() else {
            anyhow::bail!("connection failed before creating consumer");
        };

        tracing::info!("opening channel");
        let channel = connection.open_channel(None).await?;

        tracing::info!("registering channel callback");
        let consumer_cancelled = Arc::new(Notify::new());
        let channel_callback = ConsumerChannelCallback::new(Arc::clone(&consumer_cancelled));
        channel.register_callback(channel_callback).await?;

        let consumer = QueueDeliveryConsumer::new(handler, config.redelivery_delay);
        start_consuming(&channel, &config, consumer.clone()).await?;

        let state_machine = ConsumerStateMachine::new(
            rabbitmq_connection,
            connection,
            connection_rx,
            channel,
            config,
            consumer,
            consumer_cancelled,
            status_callback,
        );

        let close_notify = Arc::new(Notify::new());
        let task_handle = tokio::spawn(state_machine.run(Arc::clone(&close_notify)));

        tracing::info!("consumer started");

        Ok(Self {
            task_handle,
            close_notify,
        })
    }

    pub async fn close(self) {
        tracing::info!("closing consumer");

        self.close_notify.notify_one();
        if let Err(err) = self.task_handle.await {
            tracing::error!(%err, "consumer task failed");
        }

        tracing::info!("consumer closed");
    }
}
