use std::time::Duration;

pub struct WebSocketsServiceConfig {
    /// Must be shorter than idle_timeout
    pub ping_interval: Duration,
    pub idle_timeout: Duration,
    pub write_timeout: Duration,

    /// Capacity of the outbound queue of a single connection
    pub connection_buffer_size: usize,
}
