use async_trait::async_trait;
use axum::extract::ws::WebSocket;
use std::net::SocketAddr;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebSocketsService: Send + Sync {
    ///
    /// Registers the websocket and pushes user notifications to it
    /// until the connection is closed.
    ///
    async fn handle_client(&self, user_id: i64, address: SocketAddr, websocket: WebSocket);
}
