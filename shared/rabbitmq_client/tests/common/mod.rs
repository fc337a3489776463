use amqprs::connection::{Connection, OpenConnectionArguments};
use rabbitmq_client::{RabbitmqConnection, RabbitmqConnectionConfig};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

pub fn init_test_environment() {
    // .env is optional when variables come from CI
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_target(false)
        .with_test_writer()
        .init();
}

fn connection_arguments() -> OpenConnectionArguments {
    let uri = std::env::var("TEST_RABBITMQ_CONNECTION_URI").unwrap();
    OpenConnectionArguments::try_from(uri.as_str()).unwrap()
}

pub async fn create_connection() -> Connection {
    Connection::open(&connection_arguments()).await.unwrap()
}

pub async fn create_rabbitmq_connection() -> RabbitmqConnection {
    let retry_interval = std::env::var("TEST_RETRY_INTERVAL")
        .unwrap_or_else(|_| "1".to_string())
        .parse()
        .unwrap();

    let config = RabbitmqConnectionConfig {
        retry_interval: Duration::from_secs(retry_interval),
    };

    RabbitmqConnection::new(config, connection_arguments())
        .await
        .unwrap()
}
