use crate::{EmailJob, EmailJobsError};
use async_trait::async_trait;

#[cfg_attr(any(test, feature = "test_utils"), mockall::automock)]
#[async_trait]
pub trait EmailJobsProducer: Send + Sync {
    ///
    /// Enqueues job, returns after broker confirmed it.
    ///
    /// ### Errors
    /// - [EmailJobsError::Serialize] when job can't be serialized
    /// - [EmailJobsError::Publish] when broker is unavailable or rejected the job
    ///
    async fn publish(&self, job: EmailJob) -> Result<(), EmailJobsError>;
}
