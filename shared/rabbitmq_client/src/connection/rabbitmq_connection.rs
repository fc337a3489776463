use super::{connection_callback::ConnectionCallback, state_machine::StateMachine};
use crate::connection::RabbitmqConnectionConfig;
use amqprs::connection::{Connection, OpenConnectionArguments};
use std::sync::Arc;
use tokio::{
    sync::{watch, Notify},
    task::JoinHandle,
};

///
/// Connection shared by the job queue publisher and consumers.
///
/// A keep alive task reopens the connection after network failures.
/// - [Self::connection] is `None` while the connection is being reopened
/// - [Self::blocked_reason] is `Some` while the broker refuses to accept published messages
///
#[derive(Clone)]
pub struct RabbitmqConnection {
    inner: Arc<SharedConnection>,
}

struct SharedConnection {
    config: RabbitmqConnectionConfig,
    connection_rx: watch::Receiver<Option<Connection>>,
    blocked_reason_rx: watch::Receiver<Option<String>>,
    keep_alive: KeepAlive,
}

struct KeepAlive {
    stop: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl RabbitmqConnection {
    #[tracing::instrument(
        name = "RabbitMQ Connection",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    pub async fn new(
        config: RabbitmqConnectionConfig,
        open_connection_args: OpenConnectionArguments,
    ) -> Result<Self, amqprs::error::Error> {
        let connection = Connection::open(&open_connection_args).await?;

        let (blocked_reason_tx, blocked_reason_rx) = watch::channel(None);
        let callback = ConnectionCallback::new(blocked_reason_tx.clone());
        connection.register_callback(callback.clone()).await?;
        tracing::info!("connected");

        let (connection_tx, connection_rx) = watch::channel(Some(connection.clone()));
        let stop = Arc::new(Notify::new());
        let handle = tokio::spawn(
            StateMachine::new(
                config.clone(),
                connection,
                connection_tx,
                open_connection_args,
                callback,
                blocked_reason_tx,
            )
            .run(Arc::clone(&stop)),
        );

        Ok(Self {
            inner: Arc::new(SharedConnection {
                config,
                connection_rx,
                blocked_reason_rx,
                keep_alive: KeepAlive { stop, handle },
            }),
        })
    }

    pub fn config(&self) -> &RabbitmqConnectionConfig {
        &self.inner.config
    }

    pub fn connection(&self) -> watch::Receiver<Option<Connection>> {
        self.inner.connection_rx.clone()
    }

    pub fn blocked_reason(&self) -> watch::Receiver<Option<String>> {
        self.inner.blocked_reason_rx.clone()
    }

    ///
    /// Closes the connection once publisher and consumers are closed.
    /// While any clone is still alive it only logs an error.
    ///
    #[tracing::instrument(
        name = "RabbitMQ Connection",
        target = "rabbitmq_client::connection",
        skip_all
    )]
    pub async fn close(self) {
        let shared = match Arc::try_unwrap(self.inner) {
            Ok(shared) => shared,
            Err(inner) => {
                tracing::error!(
                    users = Arc::strong_count(&inner) - 1,
                    "connection is still used elsewhere, not closing"
                );
                return;
            }
        };

        shared.keep_alive.stop.notify_one();
        if let Err(err) = shared.keep_alive.handle.await {
            tracing::error!(%err, "keep alive task panicked");
        }
    }
}
