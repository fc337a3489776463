use super::{connection_callback::ConnectionCallback, RabbitmqConnectionConfig};
use crate::retry::retry;
use amqprs::connection::{Connection, OpenConnectionArguments};
use std::sync::Arc;
use tokio::sync::{watch, Notify};

///
/// Keeps a single connection alive:
/// `Connected -> Reopening -> RegisteringCallback -> Connected`.
///
pub struct StateMachine {
    config: RabbitmqConnectionConfig,

    connection: Connection,
    connection_tx: watch::Sender<Option<Connection>>,

    open_connection_args: OpenConnectionArguments,
    callback: ConnectionCallback,
    blocked_reason_tx: watch::Sender<Option<String>>,

    state: State,
}

enum State {
    Connected,
    Reopening,
    RegisteringCallback,
}

impl StateMachine {
    pub fn new(
        config: RabbitmqConnectionConfig,
        connection: Connection,
        connection_tx: watch::Sender<Option<Connection>>,
        open_connection_args: OpenConnectionArguments,
        callback: ConnectionCallback,
        blocked_reason_tx: watch::Sender<Option<String>>,
    ) -> Self {
        Self {
            config,
            connection,
            connection_tx,
            open_connection_args,
            callback,
            blocked_reason_tx,
            state: State::Connected,
        }
    }

    #[tracing::instrument(
        name = "RabbitMQ Connection",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    pub async fn run(mut self, stop: Arc<Notify>) {
        tracing::info!("keep alive started");

        tokio::select! {
            biased;

            _ = stop.notified() => {
                tracing::info!("closing connection");
                match self.connection.clone().close().await {
                    Ok(()) => tracing::info!("connection closed"),
                    Err(err) => tracing::warn!(%err, "failed to close connection"),
                }
            }

            _ = async { loop { self.step().await } } => {}
        }

        tracing::info!("keep alive finished");
    }

    async fn step(&mut self) {
        match self.state {
            State::Connected => {
                tracing::debug!("state: Connected");
                self.connected_state().await;
            }
            State::Reopening => {
                tracing::debug!("state: Reopening");
                self.reopening_state().await;
            }
            State::RegisteringCallback => {
                tracing::debug!("state: RegisteringCallback");
                self.registering_callback_state().await;
            }
        }
    }

    async fn connected_state(&mut self) {
        self.connection.listen_network_io_failure().await;
        tracing::warn!("connection lost");

        // consumers and publishers stop using the connection immediately
        self.connection_tx.send_replace(None);
        if let Err(err) = self.connection.clone().close().await {
            tracing::debug!(%err, "closing failed connection");
        }

        self.state = State::Reopening;
    }

    async fn reopening_state(&mut self) {
        self.connection = retry(
            self.config.retry_interval,
            |attempt| tracing::info!(attempt, "reopening connection"),
            |attempt, err| tracing::warn!(attempt, %err, "failed to reopen connection"),
            || async { Connection::open(&self.open_connection_args).await },
        )
        .await;

        // a fresh connection starts unblocked
        self.blocked_reason_tx.send_replace(None);

        self.state = State::RegisteringCallback;
    }

    async fn registering_callback_state(&mut self) {
        tokio::select! {
            _ = self.connection.listen_network_io_failure() => {
                tracing::warn!("connection lost while registering callback");
                self.state = State::Reopening;
            }

            _ = retry(
                self.config.retry_interval,
                |attempt| tracing::info!(attempt, "registering connection callback"),
                |attempt, err| tracing::warn!(attempt, %err, "failed to register connection callback"),
                || async { self.connection.register_callback(self.callback.clone()).await },
            ) => {
                tracing::info!("connection restored");
                self.connection_tx.send_replace(Some(self.connection.clone()));
                self.state = State::Connected;
            }
        }
    }
}
