use super::{Error, NotificationRelay, USER_NOTIFICATIONS_CHANNEL};
use crate::dto::output::NotificationEvent;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;
use tokio::time::timeout;

pub struct RedisNotificationRelay {
    connection: ConnectionManager,
    operation_timeout: Duration,
}

impl RedisNotificationRelay {
    pub fn new(connection: ConnectionManager, operation_timeout: Duration) -> Self {
        Self {
            connection,
            operation_timeout,
        }
    }
}

#[async_trait]
impl NotificationRelay for RedisNotificationRelay {
    async fn publish(&self, event: &NotificationEvent) -> Result<(), Error> {
        let payload = serde_json::to_string(event)?;

        // ConnectionManager clones share one multiplexed connection
        let mut connection = self.connection.clone();
        let receivers: i64 = timeout(
            self.operation_timeout,
            connection.publish(USER_NOTIFICATIONS_CHANNEL, payload),
        )
        .await
        .map_err(|_| Error::Timeout(self.operation_timeout))??;

        tracing::trace!(user_id = event.user_id, receivers, "published notification event");

        Ok(())
    }
}
