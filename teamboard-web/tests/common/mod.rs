//!
//! Tests in this directory need a running teamboard-web instance
//! together with the MongoDB and Redis it uses.
//!
//! Required env variables:
//! - TEST_TEAMBOARD_WEB_ADDRESS
//! - TEST_TEAMBOARD_WEB_JWT_SECRET (HS256)
//! - TEST_DB_CONNECTION_STRING
//! - TEST_DB_NAME
//! - TEST_REDIS_CONNECTION_STRING
//!

#![allow(dead_code)]

use email_jobs::producer::MockEmailJobsProducer;
use jsonwebtoken::{EncodingKey, Header};
use mongodb::{options::ClientOptions, Client};
use redis::aio::ConnectionManager;
use serde_json::json;
use std::{sync::Once, time::Duration};
use teamboard_web::{
    repository::{MembershipsRepositoryImpl, NotificationsRepositoryImpl},
    service::{
        notifications_service::NotificationsServiceImpl, relay::RedisNotificationRelay,
        websockets_service::ConnectionRegistry,
    },
};
use std::sync::Arc;
use uuid::Uuid;

static INIT_ENV_ONCE: Once = Once::new();

pub fn init_env() {
    INIT_ENV_ONCE.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

pub fn address() -> String {
    std::env::var("TEST_TEAMBOARD_WEB_ADDRESS").unwrap()
}

pub fn ws_url(token: &str) -> String {
    format!("ws://{}/ws/v1?token={}", address(), token)
}

pub fn random_user_id() -> i64 {
    (Uuid::new_v4().as_u64_pair().0 >> 1) as i64
}

pub fn encode_jwt(user_id: i64) -> String {
    let secret = std::env::var("TEST_TEAMBOARD_WEB_JWT_SECRET").unwrap();
    let exp = time::OffsetDateTime::now_utc().unix_timestamp() + 3600;

    jsonwebtoken::encode(
        &Header::default(),
        &json!({ "user_id": user_id, "exp": exp }),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

///
/// Service acting as another application instance.
/// It has no local connections, so pushes reach users only through the relay.
///
pub async fn create_notifications_service() -> NotificationsServiceImpl {
    let db_connection_string = std::env::var("TEST_DB_CONNECTION_STRING").unwrap();
    let db_name = std::env::var("TEST_DB_NAME").unwrap();
    let redis_connection_string = std::env::var("TEST_REDIS_CONNECTION_STRING").unwrap();

    let db_client_options = ClientOptions::parse(&db_connection_string).await.unwrap();
    let db_client = Client::with_options(db_client_options).unwrap();
    let db = db_client.database(&db_name);

    let notifications_repository = NotificationsRepositoryImpl::new(db.clone()).await.unwrap();
    let memberships_repository = MembershipsRepositoryImpl::new(db);

    let redis_client = redis::Client::open(redis_connection_string.as_str()).unwrap();
    let redis_connection = ConnectionManager::new(redis_client).await.unwrap();
    let relay = RedisNotificationRelay::new(redis_connection, Duration::from_secs(5));

    let mut email_jobs_producer = MockEmailJobsProducer::new();
    email_jobs_producer.expect_publish().returning(|_| Ok(()));

    NotificationsServiceImpl::new(
        Arc::new(notifications_repository),
        Arc::new(memberships_repository),
        Arc::new(relay),
        Arc::new(ConnectionRegistry::new()),
        Arc::new(email_jobs_producer),
    )
}
