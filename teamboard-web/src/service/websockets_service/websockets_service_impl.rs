use super::{
    dto::WebSocketsServiceConfig, websocket_connection::WebSocketConnection, ConnectionRegistry,
    WebSocketsService,
};
use async_trait::async_trait;
use axum::extract::ws::WebSocket;
use futures::StreamExt;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::mpsc;
use uuid::Uuid;

pub struct WebSocketsServiceImpl {
    config: Arc<WebSocketsServiceConfig>,
    registry: Arc<ConnectionRegistry>,
}

impl WebSocketsServiceImpl {
    pub fn new(config: WebSocketsServiceConfig, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            registry,
        }
    }
}

#[async_trait]
impl WebSocketsService for WebSocketsServiceImpl {
    async fn handle_client(&self, user_id: i64, address: SocketAddr, websocket: WebSocket) {
        let connection_id = Uuid::new_v4();
        let (messages_tx, messages_rx) = mpsc::channel(self.config.connection_buffer_size);

        // Registry owns the only sender
        self.registry
            .register(user_id, connection_id, messages_tx)
            .await;
        let count = self.registry.connection_count(user_id).await;
        tracing::info!(user_id, %address, %connection_id, count, "registered connection");

        let (ws_tx, ws_rx) = websocket.split();
        let connection = WebSocketConnection::new(
            self.config.clone(),
            self.registry.clone(),
            user_id,
            address,
            connection_id,
            messages_rx,
            ws_tx,
            ws_rx,
        );
        connection.run().await;

        let count = self.registry.connection_count(user_id).await;
        tracing::info!(user_id, %connection_id, count, "connection finished");
    }
}
