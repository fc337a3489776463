use super::RabbitmqConsumerStatus;
use async_trait::async_trait;

///
/// Callback executed whenever status of the consumer changes
///
#[async_trait]
pub trait RabbitmqConsumerStatusChangeCallback: Send + Sync + 'static {
    async fn execute(&self, status: RabbitmqConsumerStatus);
}
