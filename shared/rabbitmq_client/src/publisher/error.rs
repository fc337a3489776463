use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("connection unavailable")]
    ConnectionUnavailable,

    #[error("connection blocked by broker: {0}")]
    ConnectionBlocked(String),

    #[error("amqp error: {0}")]
    Amqp(#[from] amqprs::error::Error),

    #[error("message rejected by broker")]
    Nacked,

    #[error("publish not confirmed within {0:?}")]
    Timeout(Duration),

    #[error("channel closed before receiving publisher confirm")]
    ChannelClosed,
}
