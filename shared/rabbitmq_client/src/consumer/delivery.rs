use amqprs::{
    channel::{BasicAckArguments, BasicNackArguments, Channel},
    consumer::AsyncConsumer,
    AmqpDeliveryTag, BasicProperties, Deliver,
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

pub type HandlerError = anyhow::Error;

///
/// Processes content of a single delivery.
///
/// Delivery is acknowledged only after `handle` returns `Ok`.
/// On error the same content is requeued and handled again later,
/// possibly after other deliveries, so implementations must be idempotent.
///
#[async_trait]
pub trait DeliveryHandler: Send + Sync + 'static {
    async fn handle(&self, content: &[u8]) -> Result<(), HandlerError>;
}

///
/// Final decision made for a delivery
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Ack,
    Requeue,
}

#[async_trait]
pub trait DeliverySettler: Send + Sync {
    async fn settle(
        &self,
        delivery_tag: AmqpDeliveryTag,
        settlement: Settlement,
    ) -> Result<(), amqprs::error::Error>;
}

#[async_trait]
impl DeliverySettler for Channel {
    async fn settle(
        &self,
        delivery_tag: AmqpDeliveryTag,
        settlement: Settlement,
    ) -> Result<(), amqprs::error::Error> {
        match settlement {
            Settlement::Ack => {
                self.basic_ack(BasicAckArguments::new(delivery_tag, false))
                    .await
            }
            Settlement::Requeue => {
                self.basic_nack(BasicNackArguments::new(delivery_tag, false, true))
                    .await
            }
        }
    }
}

///
/// Runs handler and settles delivery according to its result.
///
/// Failed deliveries are held for `redelivery_delay` before requeueing
/// so a persistently failing job doesn't spin.
///
pub async fn process_delivery<Handler, Settler>(
    handler: &Handler,
    settler: &Settler,
    redelivery_delay: Duration,
    delivery_tag: AmqpDeliveryTag,
    content: &[u8],
) -> Settlement
where
    Handler: DeliveryHandler + ?Sized,
    Settler: DeliverySettler + ?Sized,
{
    let settlement = match handler.handle(content).await {
        Ok(()) => {
            tracing::info!(delivery_tag, "delivery handled");
            Settlement::Ack
        }
        Err(err) => {
            tracing::warn!(delivery_tag, "delivery handling failed: {err:#}");
            tokio::time::sleep(redelivery_delay).await;
            Settlement::Requeue
        }
    };

    // Failure means the channel is gone, broker redelivers unacked message anyway
    if let Err(err) = settler.settle(delivery_tag, settlement).await {
        tracing::warn!(delivery_tag, ?settlement, %err, "failed to settle delivery");
    }

    settlement
}

///
/// amqprs consumer processing deliveries one at a time
///
pub struct QueueDeliveryConsumer<Handler> {
    handler: Arc<Handler>,
    redelivery_delay: Duration,
}

impl<Handler> QueueDeliveryConsumer<Handler> {
    pub fn new(handler: Arc<Handler>, redelivery_delay: Duration) -> Self {
        Self {
            handler,
            redelivery_delay,
        }
    }
}

impl<Handler> Clone for QueueDeliveryConsumer<Handler> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            redelivery_delay: self.redelivery_delay,
        }
    }
}

#[async_trait]
impl<Handler> AsyncConsumer for QueueDeliveryConsumer<Handler>
where
    Handler: DeliveryHandler,
{
    #[tracing::instrument(
        name = "RabbitMQ Consumer",
        target = "rabbitmq_client::consumer",
        skip_all,
        fields(delivery_tag = deliver.delivery_tag(), redelivered = deliver.redelivered())
    )]
    async fn consume(
        &mut self,
        channel: &Channel,
        deliver: Deliver,
        _basic_properties: BasicProperties,
        content: Vec<u8>,
    ) {
        tracing::debug!("received delivery");

        process_delivery(
            self.handler.as_ref(),
            channel,
            self.redelivery_delay,
            deliver.delivery_tag(),
            &content,
        )
        .await;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::anyhow;
    use std::{
        collections::VecDeque,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    struct ScriptedHandler {
        results: Mutex<VecDeque<bool>>,
        successes: AtomicUsize,
    }

    impl ScriptedHandler {
        fn new(results: impl IntoIterator<Item = bool>) -> Self {
            Self {
                results: Mutex::new(results.into_iter().collect()),
                successes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DeliveryHandler for ScriptedHandler {
        async fn handle(&self, _content: &[u8]) -> Result<(), HandlerError> {
            let succeed = self.results.lock().unwrap().pop_front().unwrap_or(true);
            match succeed {
                true => {
                    self.successes.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
                false => Err(anyhow!("smtp unavailable")),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSettler {
        settled: Mutex<Vec<(AmqpDeliveryTag, Settlement)>>,
    }

    #[async_trait]
    impl DeliverySettler for RecordingSettler {
        async fn settle(
            &self,
            delivery_tag: AmqpDeliveryTag,
            settlement: Settlement,
        ) -> Result<(), amqprs::error::Error> {
            self.settled.lock().unwrap().push((delivery_tag, settlement));
            Ok(())
        }
    }

    struct FailingSettler;

    #[async_trait]
    impl DeliverySettler for FailingSettler {
        async fn settle(
            &self,
            _delivery_tag: AmqpDeliveryTag,
            _settlement: Settlement,
        ) -> Result<(), amqprs::error::Error> {
            Err(amqprs::error::Error::ChannelUseError(
                "channel closed".to_owned(),
            ))
        }
    }

    #[tokio::test]
    async fn success_is_acked() {
        let handler = ScriptedHandler::new([true]);
        let settler = RecordingSettler::default();

        let settlement =
            process_delivery(&handler, &settler, Duration::ZERO, 1, b"{}").await;

        assert_eq!(settlement, Settlement::Ack);
        assert_eq!(*settler.settled.lock().unwrap(), vec![(1, Settlement::Ack)]);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_requeued_after_delay() {
        let handler = ScriptedHandler::new([false]);
        let settler = RecordingSettler::default();
        let started = tokio::time::Instant::now();

        let settlement =
            process_delivery(&handler, &settler, Duration::from_secs(5), 7, b"{}").await;

        assert_eq!(settlement, Settlement::Requeue);
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(
            *settler.settled.lock().unwrap(),
            vec![(7, Settlement::Requeue)]
        );
    }

    #[tokio::test]
    async fn redelivered_job_is_acked_only_after_success() {
        let handler = ScriptedHandler::new([false, false, true]);
        let settler = RecordingSettler::default();

        // broker redelivers requeued message with a new tag
        for delivery_tag in 1..=3 {
            process_delivery(&handler, &settler, Duration::ZERO, delivery_tag, b"{}").await;
        }

        assert_eq!(handler.successes.load(Ordering::SeqCst), 1);
        assert_eq!(
            *settler.settled.lock().unwrap(),
            vec![
                (1, Settlement::Requeue),
                (2, Settlement::Requeue),
                (3, Settlement::Ack),
            ]
        );
    }

    #[tokio::test]
    async fn settle_failure_is_not_fatal() {
        let handler = ScriptedHandler::new([true]);

        let settlement =
            process_delivery(&handler, &FailingSettler, Duration::ZERO, 1, b"{}").await;

        assert_eq!(settlement, Settlement::Ack);
    }
}
