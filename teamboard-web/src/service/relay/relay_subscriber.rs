use super::USER_NOTIFICATIONS_CHANNEL;
use crate::{dto::output::NotificationEvent, service::websockets_service::ConnectionRegistry};
use anyhow::anyhow;
use futures::StreamExt;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::Notify,
    task::JoinHandle,
    time::{sleep, timeout},
};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

enum SessionExit {
    /// Subscription was established and later the stream ended
    StreamEnded,
    ConnectFailed(anyhow::Error),
}

///
/// Background task that forwards events from the relay channel
/// to connections registered in this process.
///
/// Reconnects with exponential backoff until closed.
///
pub struct RelaySubscriber {
    close_notify: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl RelaySubscriber {
    pub fn new(
        client: redis::Client,
        registry: Arc<ConnectionRegistry>,
        operation_timeout: Duration,
    ) -> Self {
        let close_notify = Arc::new(Notify::new());
        let handle = tokio::spawn(Self::run(
            client,
            registry,
            operation_timeout,
            close_notify.clone(),
        ));

        Self {
            close_notify,
            handle,
        }
    }

    pub async fn close(self) {
        tracing::info!("closing relay subscriber");
        self.close_notify.notify_one();
        if let Err(err) = self.handle.await {
            tracing::error!(%err, "relay subscriber task failed");
        }
        tracing::info!("closed relay subscriber");
    }

    #[tracing::instrument(name = "Relay subscriber", skip_all)]
    async fn run(
        client: redis::Client,
        registry: Arc<ConnectionRegistry>,
        operation_timeout: Duration,
        close_notify: Arc<Notify>,
    ) {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            let exit = tokio::select! {
                _ = close_notify.notified() => return,
                exit = Self::run_session(&client, &registry, operation_timeout) => exit,
            };

            match exit {
                SessionExit::StreamEnded => {
                    tracing::warn!("relay stream ended");
                    backoff = INITIAL_BACKOFF;
                }
                SessionExit::ConnectFailed(err) => {
                    tracing::error!(%err, backoff_secs = backoff.as_secs(), "relay subscription failed");
                }
            }

            tokio::select! {
                _ = close_notify.notified() => return,
                _ = sleep(backoff) => {}
            }
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    async fn run_session(
        client: &redis::Client,
        registry: &ConnectionRegistry,
        operation_timeout: Duration,
    ) -> SessionExit {
        let mut pubsub = match timeout(operation_timeout, client.get_async_pubsub()).await {
            Ok(Ok(pubsub)) => pubsub,
            Ok(Err(err)) => {
                return SessionExit::ConnectFailed(anyhow!("failed to connect: {err}"));
            }
            Err(_) => return SessionExit::ConnectFailed(anyhow!("connecting timed out")),
        };

        match timeout(operation_timeout, pubsub.subscribe(USER_NOTIFICATIONS_CHANNEL)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                return SessionExit::ConnectFailed(anyhow!("failed to subscribe: {err}"));
            }
            Err(_) => return SessionExit::ConnectFailed(anyhow!("subscribing timed out")),
        }
        tracing::info!(channel = USER_NOTIFICATIONS_CHANNEL, "subscribed");

        let mut stream = pubsub.on_message();
        while let Some(message) = stream.next().await {
            let payload: String = match message.get_payload() {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::warn!(%err, "invalid payload");
                    continue;
                }
            };

            forward_event(registry, &payload).await;
        }

        SessionExit::StreamEnded
    }
}

///
/// Malformed payloads are logged and skipped
///
async fn forward_event(registry: &ConnectionRegistry, payload: &str) {
    let event = match serde_json::from_str::<NotificationEvent>(payload) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(%err, "skipping malformed notification event");
            return;
        }
    };

    tracing::debug!(user_id = event.user_id, "received notification event");
    registry.send(event.user_id, Arc::new(event)).await;
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test]
    async fn forward_event_reaches_user_connection() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::channel(4);
        registry.register(5, Uuid::new_v4(), tx).await;

        forward_event(
            &registry,
            r#"{"user_id":5,"title":"Team Deleted","content":"Team 'Core' has been deleted."}"#,
        )
        .await;

        let event = rx.try_recv().unwrap();
        assert_eq!(event.title, "Team Deleted");
    }

    #[tokio::test]
    async fn forward_event_malformed_payload_is_skipped() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::channel(4);
        registry.register(5, Uuid::new_v4(), tx).await;

        forward_event(&registry, "not json").await;
        forward_event(&registry, r#"{"user_id":"5"}"#).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(registry.connection_count(5).await, 1);
    }

    #[tokio::test]
    async fn close_stops_retrying_subscriber() {
        // nothing listens on this port, so the subscriber keeps backing off
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let subscriber = RelaySubscriber::new(
            client,
            Arc::new(ConnectionRegistry::new()),
            Duration::from_millis(100),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;

        timeout(Duration::from_secs(2), subscriber.close())
            .await
            .unwrap();
    }
}
