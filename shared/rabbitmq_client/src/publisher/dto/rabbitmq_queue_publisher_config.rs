use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RabbitmqQueuePublisherConfig {
    ///
    /// Durable queue messages are routed to through the default exchange
    ///
    pub queue: String,

    ///
    /// Upper bound of a single publish: waiting for other publishes,
    /// opening the channel, sending the message and receiving its confirm
    ///
    pub publish_timeout: Duration,
}
