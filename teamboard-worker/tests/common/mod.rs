//!
//! Tests in this directory need a running teamboard-worker instance,
//! the RabbitMQ it consumes and a MailHog compatible SMTP catcher it sends to.
//!
//! Required env variables:
//! - TEST_RABBITMQ_CONNECTION_STRING
//! - TEST_MAILHOG_API_ADDRESS
//!

#![allow(dead_code)]

use amqprs::connection::OpenConnectionArguments;
use email_jobs::RabbitmqEmailJobsProducer;
use rabbitmq_client::{RabbitmqConnection, RabbitmqConnectionConfig};
use serde_json::Value;
use std::{sync::Once, time::Duration};

static INIT_ENV_ONCE: Once = Once::new();

pub fn init_env() {
    INIT_ENV_ONCE.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

pub async fn create_producer() -> (RabbitmqConnection, RabbitmqEmailJobsProducer) {
    let connection_string = std::env::var("TEST_RABBITMQ_CONNECTION_STRING").unwrap();
    let config = RabbitmqConnectionConfig {
        retry_interval: Duration::from_secs(1),
    };
    let open_connection_args =
        OpenConnectionArguments::try_from(connection_string.as_str()).unwrap();
    let connection = RabbitmqConnection::new(config, open_connection_args)
        .await
        .unwrap();
    let producer = RabbitmqEmailJobsProducer::new(connection.clone(), Duration::from_secs(5));

    (connection, producer)
}

///
/// Messages received by the SMTP catcher for `to`
///
pub async fn received_messages(to: &str) -> Vec<Value> {
    let address = std::env::var("TEST_MAILHOG_API_ADDRESS").unwrap();
    let response = reqwest::Client::new()
        .get(format!("http://{address}/api/v2/search"))
        .query(&[("kind", "to"), ("query", to)])
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();

    response["items"].as_array().cloned().unwrap_or_default()
}

pub async fn wait_for_messages(to: &str, timeout: Duration) -> Vec<Value> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let messages = received_messages(to).await;
        if !messages.is_empty() || tokio::time::Instant::now() >= deadline {
            return messages;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}
