use super::Error;
use crate::dto::output::NotificationEvent;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRelay: Send + Sync {
    ///
    /// Publishes event to every application instance, including this one.
    /// Delivery is best-effort.
    ///
    async fn publish(&self, event: &NotificationEvent) -> Result<(), Error>;
}
