use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("failed to serialize notification event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}
