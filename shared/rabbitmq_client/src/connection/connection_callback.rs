use amqprs::{connection::Connection, Close};
use async_trait::async_trait;
use tokio::sync::watch;

///
/// Tracks broker flow control.
///
/// Broker sends `connection.blocked` when it runs low on memory or disk and
/// stops reading published messages until `connection.unblocked`.
/// The reason stays in the watch channel so publishers can refuse to publish meanwhile.
///
#[derive(Clone)]
pub struct ConnectionCallback {
    blocked_reason_tx: watch::Sender<Option<String>>,
}

impl ConnectionCallback {
    pub fn new(blocked_reason_tx: watch::Sender<Option<String>>) -> Self {
        Self { blocked_reason_tx }
    }

    fn block(&self, reason: String) {
        let previous = self.blocked_reason_tx.send_replace(Some(reason));
        if previous.is_some() {
            tracing::debug!("connection was already blocked");
        }
    }

    fn unblock(&self) {
        self.blocked_reason_tx.send_replace(None);
    }
}

#[async_trait]
impl amqprs::callbacks::ConnectionCallback for ConnectionCallback {
    #[tracing::instrument(
        name = "RabbitMQ Connection Callback",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    async fn close(
        &mut self,
        _connection: &Connection,
        close: Close,
    ) -> Result<(), amqprs::error::Error> {
        tracing::warn!(
            code = close.reply_code(),
            text = close.reply_text(),
            "broker closed connection",
        );

        Ok(())
    }

    #[tracing::instrument(
        name = "RabbitMQ Connection Callback",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    async fn blocked(&mut self, _connection: &Connection, reason: String) {
        tracing::warn!(%reason, "broker blocked publishing");
        self.block(reason);
    }

    #[tracing::instrument(
        name = "RabbitMQ Connection Callback",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    async fn unblocked(&mut self, _connection: &Connection) {
        tracing::info!("broker resumed publishing");
        self.unblock();
    }
}
