use rabbitmq_client::PublishError;

#[derive(Debug, thiserror::Error)]
pub enum EmailJobsError {
    #[error("failed to serialize email job: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to publish email job: {0}")]
    Publish(#[from] PublishError),
}
