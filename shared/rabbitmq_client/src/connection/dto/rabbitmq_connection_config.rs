use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RabbitmqConnectionConfig {
    ///
    /// Delay between attempts to restore connection, channels and consumers
    ///
    pub retry_interval: Duration,
}
