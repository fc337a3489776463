use crate::dto::output::NotificationEvent;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    RwLock,
};
use uuid::Uuid;

pub type ConnectionSender = mpsc::Sender<Arc<NotificationEvent>>;

///
/// Routes notifications to live websocket connections.
///
/// Registry keeps only the sending half of each connection queue.
/// Dropping it closes the queue, which tells the connection to shut down.
/// A user key exists only while the user has at least one registered connection.
///
pub struct ConnectionRegistry {
    users_connections: RwLock<HashMap<i64, HashMap<Uuid, ConnectionSender>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            users_connections: RwLock::new(HashMap::new()),
        }
    }

    ///
    /// Registering the same connection_id again replaces its sender
    ///
    pub async fn register(&self, user_id: i64, connection_id: Uuid, tx: ConnectionSender) {
        let mut users_connections = self.users_connections.write().await;
        users_connections
            .entry(user_id)
            .or_default()
            .insert(connection_id, tx);
    }

    ///
    /// ### Returns
    /// true if connection was registered
    ///
    pub async fn unregister(&self, user_id: i64, connection_id: Uuid) -> bool {
        let removed = {
            let mut users_connections = self.users_connections.write().await;
            let Some(connections) = users_connections.get_mut(&user_id) else {
                return false;
            };

            let removed = connections.remove(&connection_id);
            if connections.is_empty() {
                users_connections.remove(&user_id);
            }

            removed
        };

        removed.is_some()
    }

    ///
    /// Queues event on every connection of the user without waiting.
    /// Connections with full or closed queue are unregistered.
    ///
    pub async fn send(&self, user_id: i64, event: Arc<NotificationEvent>) {
        let connections = {
            let users_connections = self.users_connections.read().await;
            let Some(connections) = users_connections.get(&user_id) else {
                tracing::trace!(user_id, "user has no connections");
                return;
            };

            connections
                .iter()
                .map(|(connection_id, tx)| (*connection_id, tx.clone()))
                .collect::<Vec<_>>()
        };

        let mut evicted = Vec::new();
        for (connection_id, tx) in connections {
            match tx.try_send(event.clone()) {
                Ok(()) => {
                    tracing::debug!(user_id, %connection_id, "queued notification");
                }
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(user_id, %connection_id, "connection queue full");
                    evicted.push(connection_id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(user_id, %connection_id, "connection queue closed");
                    evicted.push(connection_id);
                }
            }
        }

        for connection_id in evicted {
            if self.unregister(user_id, connection_id).await {
                tracing::info!(user_id, %connection_id, "evicted connection");
            }
        }
    }

    pub async fn connection_count(&self, user_id: i64) -> usize {
        let users_connections = self.users_connections.read().await;
        users_connections
            .get(&user_id)
            .map(|connections| connections.len())
            .unwrap_or(0)
    }

    pub async fn users_count(&self) -> usize {
        self.users_connections.read().await.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use mpsc::error::TryRecvError;

    fn create_event(user_id: i64) -> Arc<NotificationEvent> {
        Arc::new(NotificationEvent {
            user_id,
            title: "Added to Team".to_string(),
            content: "You have been added to the team 'Core'.".to_string(),
        })
    }

    #[tokio::test]
    async fn send_reaches_every_connection_of_user() {
        let registry = ConnectionRegistry::new();
        let (tx_1, mut rx_1) = mpsc::channel(4);
        let (tx_2, mut rx_2) = mpsc::channel(4);
        let (tx_3, mut rx_3) = mpsc::channel(4);
        registry.register(1, Uuid::new_v4(), tx_1).await;
        registry.register(1, Uuid::new_v4(), tx_2).await;
        registry.register(2, Uuid::new_v4(), tx_3).await;

        registry.send(1, create_event(1)).await;

        assert_eq!(rx_1.try_recv().unwrap().user_id, 1);
        assert_eq!(rx_2.try_recv().unwrap().user_id, 1);
        assert!(matches!(rx_3.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn send_user_without_connections_is_noop() {
        let registry = ConnectionRegistry::new();

        registry.send(1, create_event(1)).await;

        assert_eq!(registry.users_count().await, 0);
    }

    #[tokio::test]
    async fn register_same_connection_replaces_sender() {
        let registry = ConnectionRegistry::new();
        let connection_id = Uuid::new_v4();
        let (tx_old, mut rx_old) = mpsc::channel(4);
        let (tx_new, mut rx_new) = mpsc::channel(4);

        registry.register(1, connection_id, tx_old).await;
        registry.register(1, connection_id, tx_new).await;
        registry.send(1, create_event(1)).await;

        assert_eq!(registry.connection_count(1).await, 1);
        assert!(matches!(rx_old.try_recv(), Err(TryRecvError::Disconnected)));
        assert!(rx_new.try_recv().is_ok());
    }

    #[tokio::test]
    async fn unregister_last_connection_removes_user() {
        let registry = ConnectionRegistry::new();
        let connection_1 = Uuid::new_v4();
        let connection_2 = Uuid::new_v4();
        let (tx_1, _rx_1) = mpsc::channel(4);
        let (tx_2, _rx_2) = mpsc::channel(4);
        registry.register(1, connection_1, tx_1).await;
        registry.register(1, connection_2, tx_2).await;

        assert!(registry.unregister(1, connection_1).await);
        assert_eq!(registry.users_count().await, 1);

        assert!(registry.unregister(1, connection_2).await);
        assert_eq!(registry.users_count().await, 0);
    }

    #[tokio::test]
    async fn unregister_twice_is_noop() {
        let registry = ConnectionRegistry::new();
        let connection_id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(4);
        registry.register(1, connection_id, tx).await;

        assert!(registry.unregister(1, connection_id).await);
        assert!(!registry.unregister(1, connection_id).await);
        assert!(!registry.unregister(2, connection_id).await);

        // registry held the only sender
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn send_full_queue_evicts_only_slow_connection() {
        let registry = ConnectionRegistry::new();
        let slow_id = Uuid::new_v4();
        let (slow_tx, mut slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(8);
        registry.register(1, slow_id, slow_tx).await;
        registry.register(1, Uuid::new_v4(), fast_tx).await;

        registry.send(1, create_event(1)).await;
        registry.send(1, create_event(1)).await;

        assert_eq!(registry.connection_count(1).await, 1);

        // slow connection gets what was queued and then sees closed queue
        assert!(slow_rx.recv().await.is_some());
        assert!(slow_rx.recv().await.is_none());

        assert!(fast_rx.try_recv().is_ok());
        assert!(fast_rx.try_recv().is_ok());

        assert!(!registry.unregister(1, slow_id).await);
    }

    #[tokio::test]
    async fn send_closed_queue_evicts_connection() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::channel(4);
        registry.register(1, Uuid::new_v4(), tx).await;
        drop(rx);

        registry.send(1, create_event(1)).await;

        assert_eq!(registry.connection_count(1).await, 0);
        assert_eq!(registry.users_count().await, 0);
    }

    #[tokio::test]
    async fn concurrent_register_unregister_keeps_map_consistent() {
        let registry = Arc::new(ConnectionRegistry::new());

        let handles = (0..32)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    let user_id = i % 4;
                    let connection_id = Uuid::new_v4();
                    let (tx, _rx) = mpsc::channel(1);
                    registry.register(user_id, connection_id, tx).await;
                    registry.send(user_id, create_event(user_id)).await;
                    registry.unregister(user_id, connection_id).await;
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.users_count().await, 0);
    }
}
