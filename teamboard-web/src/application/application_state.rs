use super::ApplicationEnv;
use crate::{
    auth::JwtDecoder,
    repository::{MembershipsRepositoryImpl, NotificationsRepositoryImpl},
    service::{
        notifications_service::{NotificationsService, NotificationsServiceImpl},
        relay::{RedisNotificationRelay, RelaySubscriber},
        websockets_service::{
            ConnectionRegistry, WebSocketsService, WebSocketsServiceConfig, WebSocketsServiceImpl,
        },
    },
};
use amqprs::connection::OpenConnectionArguments;
use anyhow::anyhow;
use axum::extract::FromRef;
use email_jobs::RabbitmqEmailJobsProducer;
use mongodb::{options::ClientOptions, Client};
use rabbitmq_client::{RabbitmqConnection, RabbitmqConnectionConfig};
use redis::aio::ConnectionManager;
use std::sync::Arc;
use tokio::time::timeout;

#[derive(Clone, Copy)]
pub struct WebSocketUpgradeConfig {
    pub max_message_size: usize,
}

#[derive(Clone, FromRef)]
pub struct ApplicationState {
    pub notifications_service: Arc<dyn NotificationsService>,
    pub websockets_service: Arc<dyn WebSocketsService>,
    pub jwt_decoder: JwtDecoder,
    pub websocket_upgrade_config: WebSocketUpgradeConfig,
}

pub struct ApplicationStateToClose {
    pub db_client: Client,
    pub rabbitmq_connection: RabbitmqConnection,
    pub email_jobs_producer: Arc<RabbitmqEmailJobsProducer>,
    pub relay_subscriber: RelaySubscriber,
}

pub async fn create_state(
    env: &ApplicationEnv,
) -> anyhow::Result<(ApplicationState, ApplicationStateToClose)> {
    tracing::info!("connecting to database");
    let db_client_options = ClientOptions::parse(&env.db_connection_string).await?;
    let db_client = Client::with_options(db_client_options)?;
    let db = db_client.database(&env.db_name);

    tracing::info!("creating repositories");
    let notifications_repository = NotificationsRepositoryImpl::new(db.clone()).await?;
    let notifications_repository = Arc::new(notifications_repository);
    let memberships_repository = MembershipsRepositoryImpl::new(db);
    let memberships_repository = Arc::new(memberships_repository);

    tracing::info!("connecting to rabbitmq");
    let config = RabbitmqConnectionConfig {
        retry_interval: env.rabbitmq_retry_interval,
    };
    let open_connection_args =
        OpenConnectionArguments::try_from(env.rabbitmq_connection_string.as_str())?;
    let rabbitmq_connection = RabbitmqConnection::new(config, open_connection_args).await?;

    let email_jobs_producer = RabbitmqEmailJobsProducer::new(
        rabbitmq_connection.clone(),
        env.rabbitmq_publish_timeout,
    );
    let email_jobs_producer = Arc::new(email_jobs_producer);

    tracing::info!("connecting to redis");
    let redis_client = redis::Client::open(env.redis_connection_string.as_str())?;
    let redis_connection = timeout(
        env.redis_operation_timeout,
        ConnectionManager::new(redis_client.clone()),
    )
    .await
    .map_err(|_| anyhow!("connecting to redis timed out"))??;

    tracing::info!("creating services");
    let registry = Arc::new(ConnectionRegistry::new());

    let relay = RedisNotificationRelay::new(redis_connection, env.redis_operation_timeout);
    let relay = Arc::new(relay);
    let relay_subscriber =
        RelaySubscriber::new(redis_client, registry.clone(), env.redis_operation_timeout);

    let notifications_service = NotificationsServiceImpl::new(
        notifications_repository,
        memberships_repository,
        relay,
        registry.clone(),
        email_jobs_producer.clone(),
    );
    let notifications_service = Arc::new(notifications_service);

    let config = WebSocketsServiceConfig {
        ping_interval: env.websocket_ping_interval,
        idle_timeout: env.websocket_idle_timeout,
        write_timeout: env.websocket_write_timeout,
        connection_buffer_size: env.websocket_connection_buffer_size,
    };
    let websockets_service = WebSocketsServiceImpl::new(config, registry);
    let websockets_service = Arc::new(websockets_service);

    let jwt_decoder = JwtDecoder::new(env.jwt_key.clone(), env.jwt_algorithms.clone());

    let websocket_upgrade_config = WebSocketUpgradeConfig {
        max_message_size: env.websocket_max_message_size,
    };

    Ok((
        ApplicationState {
            notifications_service,
            websockets_service,
            jwt_decoder,
            websocket_upgrade_config,
        },
        ApplicationStateToClose {
            db_client,
            rabbitmq_connection,
            email_jobs_producer,
            relay_subscriber,
        },
    ))
}
