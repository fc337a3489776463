use super::{dto::WebSocketsServiceConfig, error::Error, ConnectionRegistry};
use crate::dto::output::NotificationEvent;
use anyhow::anyhow;
use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::{fmt::Display, net::SocketAddr, sync::Arc};
use tokio::{
    sync::mpsc,
    time::{sleep_until, timeout, Instant},
};
use uuid::Uuid;

pub struct WebSocketConnection<WebSocketSink, WebSocketStream> {
    config: Arc<WebSocketsServiceConfig>,
    registry: Arc<ConnectionRegistry>,

    user_id: i64,
    user_address: SocketAddr,
    connection_id: Uuid,

    messages_rx: mpsc::Receiver<Arc<NotificationEvent>>,
    ws_tx: WebSocketSink,
    ws_rx: WebSocketStream,

    ping_time: Instant,
    idle_deadline: Instant,
}

impl<WebSocketSink, WebSocketStream, SinkError, StreamError>
    WebSocketConnection<WebSocketSink, WebSocketStream>
where
    WebSocketSink: Sink<Message, Error = SinkError> + Unpin,
    WebSocketStream: Stream<Item = Result<Message, StreamError>> + Unpin,
    SinkError: Display,
    StreamError: Display,
{
    pub fn new(
        config: Arc<WebSocketsServiceConfig>,
        registry: Arc<ConnectionRegistry>,
        user_id: i64,
        user_address: SocketAddr,
        connection_id: Uuid,
        messages_rx: mpsc::Receiver<Arc<NotificationEvent>>,
        ws_tx: WebSocketSink,
        ws_rx: WebSocketStream,
    ) -> Self {
        let now = Instant::now();
        let ping_time = now + config.ping_interval;
        let idle_deadline = now + config.idle_timeout;

        Self {
            config,
            registry,
            user_id,
            user_address,
            connection_id,
            messages_rx,
            ws_tx,
            ws_rx,
            ping_time,
            idle_deadline,
        }
    }

    #[tracing::instrument(
        name = "WebSocket",
        skip_all,
        fields(
            user_id = self.user_id,
            address = %self.user_address,
            connection_id = %self.connection_id,
        )
    )]
    pub async fn run(mut self) {
        match self.try_run().await {
            Ok(()) => (),
            Err(Error::Close(message)) => {
                tracing::info!("closing connection: {message}");
            }
            Err(Error::Anyhow(err)) => {
                tracing::warn!("{err}");
            }
        }

        if self
            .registry
            .unregister(self.user_id, self.connection_id)
            .await
        {
            tracing::debug!("unregistered connection");
        }

        tracing::info!("closing websocket");
        match timeout(self.config.write_timeout, self.ws_tx.close()).await {
            Ok(Ok(())) => tracing::info!("websocket closed"),
            Ok(Err(err)) => tracing::warn!(%err, "failed to close websocket"),
            Err(_) => tracing::warn!("closing websocket timed out"),
        }
    }

    async fn try_run(&mut self) -> Result<(), Error> {
        loop {
            tokio::select! {
                biased;

                // Wait for new notification to send
                message = self.messages_rx.recv() => {
                    self.process_message(message).await?;
                }

                // Wait for message from the user
                message = self.ws_rx.next() => {
                    self.process_incomming_message(message)?;
                }

                // User did not send anything for too long
                _ = sleep_until(self.idle_deadline) => {
                    return Err(Error::Anyhow(anyhow!("user unresponsive")));
                }

                // Wait for time to send the ping
                _ = sleep_until(self.ping_time) => {
                    self.process_ping().await?;
                }
            }
        }
    }

    async fn write(&mut self, message: Message) -> anyhow::Result<()> {
        match timeout(self.config.write_timeout, self.ws_tx.send(message)).await {
            Ok(result) => result.map_err(|err| anyhow!("{err}")),
            Err(_) => Err(anyhow!(
                "write timed out after {:?}",
                self.config.write_timeout
            )),
        }
    }

    async fn process_ping(&mut self) -> anyhow::Result<()> {
        self.write(Message::Ping(Vec::new()))
            .await
            .map_err(|err| anyhow!("failed to send ping: {err}"))?;
        tracing::trace!("ping sent");

        self.ping_time = Instant::now() + self.config.ping_interval;

        Ok(())
    }

    fn process_incomming_message(
        &mut self,
        message: Option<Result<Message, StreamError>>,
    ) -> Result<(), Error> {
        match message {
            Some(Ok(Message::Close(_))) => {
                return Err(Error::Close("received close message"));
            }
            Some(Ok(Message::Pong(_))) => tracing::trace!("received pong"),
            Some(Ok(_)) => tracing::trace!("ignored incomming message"),
            Some(Err(err)) => {
                return Err(Error::Anyhow(anyhow!(
                    "failed to read incomming message: {err}"
                )));
            }
            None => return Err(Error::Anyhow(anyhow!("incomming messages stream closed"))),
        }

        self.idle_deadline = Instant::now() + self.config.idle_timeout;

        Ok(())
    }

    async fn process_message(
        &mut self,
        message: Option<Arc<NotificationEvent>>,
    ) -> Result<(), Error> {
        let Some(event) = message else {
            // Registry dropped the sender
            self.write(Message::Close(None))
                .await
                .map_err(|err| anyhow!("failed to send close message: {err}"))?;
            return Err(Error::Close("connection evicted"));
        };

        let payload = serde_json::to_string(event.as_ref())
            .map_err(|err| anyhow!("failed to serialize notification: {err}"))?;

        tracing::debug!(title = %event.title, "sending notification");
        self.write(Message::Text(payload))
            .await
            .map_err(|err| anyhow!("sending notification failed: {err}"))?;
        tracing::debug!("sent notification");

        Ok(())
    }
}
