use super::{
    consumer_channel_callback::ConsumerChannelCallback, delivery::QueueDeliveryConsumer,
    DeliveryHandler, RabbitmqConsumerStatus, RabbitmqConsumerStatusChangeCallback,
    RabbitmqQueueConsumerConfig,
};
use crate::{retry::retry, RabbitmqConnection};
use amqprs::{
    channel::{
        BasicCancelArguments, BasicConsumeArguments, BasicQosArguments, Channel,
        QueueDeclareArguments,
    },
    connection::Connection,
};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::{watch, Notify};

///
/// Declares queue, sets QoS and starts consuming on `channel`
///
pub async fn start_consuming<Handler>(
    channel: &Channel,
    config: &RabbitmqQueueConsumerConfig,
    consumer: QueueDeliveryConsumer<Handler>,
) -> anyhow::Result<()>
where
    Handler: DeliveryHandler,
{
    tracing::info!("declaring queue");
    let queue_declare_args = QueueDeclareArguments::new(&config.queue)
        .durable(true)
        .finish();
    channel
        .queue_declare(queue_declare_args)
        .await
        .context("failed to declare queue")?;

    tracing::info!(prefetch_count = config.prefetch_count, "setting qos");
    channel
        .basic_qos(BasicQosArguments::new(0, config.prefetch_count, false))
        .await
        .context("failed to set qos")?;

    tracing::info!("consuming");
    let basic_consume_args = BasicConsumeArguments::new(&config.queue, &config.consumer_tag)
        .manual_ack(true)
        .finish();
    channel
        .basic_consume(consumer, basic_consume_args)
        .await
        .context("failed to consume")?;

    Ok(())
}

pub struct ConsumerStateMachine<Handler, StatusCallback> {
    rabbitmq_connection: RabbitmqConnection,

    connection: Option<Connection>,
    connection_rx: watch::Receiver<Option<Connection>>,

    channel: Channel,
    config: RabbitmqQueueConsumerConfig,
    consumer: QueueDeliveryConsumer<Handler>,

    consumer_cancelled: Arc<Notify>,
    status_callback: StatusCallback,

    state: State,
}

impl<Handler, StatusCallback> ConsumerStateMachine<Handler, StatusCallback>
where
    Handler: DeliveryHandler,
    StatusCallback: RabbitmqConsumerStatusChangeCallback,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rabbitmq_connection: RabbitmqConnection,
        connection: Connection,
        connection_rx: watch::Receiver<Option<Connection>>,
        channel: Channel,
        config: RabbitmqQueueConsumerConfig,
        consumer: QueueDeliveryConsumer<Handler>,
        consumer_cancelled: Arc<Notify>,
        status_callback: StatusCallback,
    ) -> Self {
        Self {
            rabbitmq_connection,
            connection: Some(connection),
            connection_rx,
            channel,
            config,
            consumer,
            consumer_cancelled,
            status_callback,
            state: State::Consuming,
        }
    }

    ///
    /// Infinite loop that keeps consumer alive.
    /// Loop can be stopped by using notify.
    ///
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all,
        fields(queue = %self.config.queue)
    )]
    pub async fn run(mut self, stop: Arc<Notify>) {
        tracing::info!("state machine started");

        tokio::select! {
            biased;

            _ = stop.notified() => {
                tracing::info!("cancelling consumer");
                let args = BasicCancelArguments::new(&self.config.consumer_tag);
                match self.channel.basic_cancel(args).await {
                    Ok(_) => tracing::info!("consumer cancelled"),
                    Err(err) => tracing::warn!(%err, "cancelling consumer failed"),
                }

                tracing::info!("closing channel");
                match self.channel.close().await {
                    Ok(()) => tracing::info!("channel closed"),
                    Err(err) => tracing::warn!(%err, "closing channel failed"),
                }
            }

            _ = async { loop { self.step().await } } => {}
        }

        tracing::info!("state machine finished");
    }

    async fn step(&mut self) {
        match self.state {
            State::Consuming => {
                tracing::info!("state: Consuming");
                self.consuming_state().await;
            }
            State::WaitingForConnection => {
                tracing::info!("state: WaitingForConnection");
                self.waiting_for_connection_state().await;
            }
            State::RecreatingChannel => {
                tracing::info!("state: RecreatingChannel");
                self.recreating_channel_state().await;
            }
            State::RestoringConsumer => {
                tracing::info!("state: RestoringConsumer");
                self.restoring_consumer_state().await;
            }
        }
    }

    async fn consuming_state(&mut self) {
        self.status_callback
            .execute(RabbitmqConsumerStatus::Consuming)
            .await;

        tokio::select! {
            biased;

            _ = self.connection_rx.changed() => {
                tracing::info!("connection changed");
                self.state = State::WaitingForConnection;
            }
            _ = self.consumer_cancelled.notified() => {
                tracing::info!("consumer got cancelled");
                self.state = State::RecreatingChannel;
            }
        }

        self.status_callback
            .execute(RabbitmqConsumerStatus::Recovering)
            .await;
    }

    async fn waiting_for_connection_state(&mut self) {
        loop {
            // value could have changed again since last notification
            self.connection = self.connection_rx.borrow_and_update().clone();
            if self.connection.is_some() {
                break;
            }

            if self.connection_rx.changed().await.is_err() {
                tracing::warn!("connection closed, waiting for shutdown");
                std::future::pending::<()>().await;
            }
        }

        self.state = State::RecreatingChannel;
    }

    async fn recreating_channel_state(&mut self) {
        let Some(connection) = self.connection.clone() else {
            self.state = State::WaitingForConnection;
            return;
        };

        tracing::info!("closing old channel");
        match self.channel.clone().close().await {
            Ok(()) => tracing::info!("channel closed"),
            Err(err) => tracing::debug!(%err, "failed to close channel"),
        }

        let retry_interval = self.rabbitmq_connection.config().retry_interval;

        tokio::select! {
            biased;

            _ = self.connection_rx.changed() => {
                tracing::info!("connection changed");
                self.state = State::WaitingForConnection;
            }

            (channel, consumer_cancelled) = async {
                let channel = retry(
                    retry_interval,
                    |attempt| tracing::info!(attempt, "recreating channel"),
                    |attempt, err| tracing::warn!(attempt, %err, "failed to recreate channel"),
                    || async { connection.open_channel(None).await },
                )
                .await;

                let consumer_cancelled = Arc::new(Notify::new());
                retry(
                    retry_interval,
                    |attempt| tracing::info!(attempt, "registering channel callback"),
                    |attempt, err| tracing::warn!(attempt, %err, "failed to register channel callback"),
                    || async {
                        let callback = ConsumerChannelCallback::new(Arc::clone(&consumer_cancelled));
                        channel.register_callback(callback).await
                    },
                )
                .await;

                (channel, consumer_cancelled)
            } => {
                self.channel = channel;
                self.consumer_cancelled = consumer_cancelled;
                self.state = State::RestoringConsumer;
            }
        }
    }

    async fn restoring_consumer_state(&mut self) {
        tokio::select! {
            biased;

            _ = self.connection_rx.changed() => {
                tracing::info!("connection changed");
                self.state = State::WaitingForConnection;
            }

            result = start_consuming(&self.channel, &self.config, self.consumer.clone()) => {
                match result {
                    Ok(()) => self.state = State::Consuming,
                    Err(err) => {
                        tracing::warn!("failed to restore consumer: {err:#}");
                        tokio::time::sleep(self.rabbitmq_connection.config().retry_interval).await;
                        self.state = State::RecreatingChannel;
                    }
                }
            }
        }
    }
}

enum State {
    Consuming,
    WaitingForConnection,
    RecreatingChannel,
    RestoringConsumer,
}
