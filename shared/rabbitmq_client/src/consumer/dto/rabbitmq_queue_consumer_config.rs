use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RabbitmqQueueConsumerConfig {
    pub queue: String,
    pub consumer_tag: String,

    ///
    /// Number of unacknowledged deliveries broker is allowed to push
    ///
    pub prefetch_count: u16,

    ///
    /// Delay between handler failure and requeueing the delivery
    ///
    pub redelivery_delay: Duration,
}
