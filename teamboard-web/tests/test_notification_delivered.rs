mod common;

pub use common::*;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use serial_test::serial;
use std::time::Duration;
use teamboard_web::service::notifications_service::NotificationsService;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
#[serial]
async fn notification_created_elsewhere_is_pushed_and_listed() {
    init_env();

    let user_id = random_user_id();
    let jwt = encode_jwt(user_id);
    let service = create_notifications_service().await;

    let (mut ws, _) = tokio_tungstenite::connect_async(ws_url(&jwt))
        .await
        .unwrap();

    // give the server time to register connection
    tokio::time::sleep(Duration::from_millis(100)).await;

    service
        .notify_team_deleted("Core", &[user_id])
        .await
        .unwrap();

    let message = loop {
        let message = timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap() // timeout
            .unwrap() // stream
            .unwrap(); // message
        if let Message::Text(text) = message {
            break text;
        }
    };
    let event = serde_json::from_str::<Value>(&message).unwrap();
    assert_eq!(event["user_id"].as_i64(), Some(user_id));
    assert_eq!(event["title"], "Team Deleted");
    assert_eq!(event["content"], "Team 'Core' has been deleted.");

    let client = Client::new();

    let response = client
        .get(format!("http://{}/api/v1/notifications", address()))
        .bearer_auth(&jwt)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.json::<Value>().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["notifications"][0]["is_read"], false);
    let id = page["notifications"][0]["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let response = client
            .put(format!(
                "http://{}/api/v1/notifications/{id}/read",
                address()
            ))
            .bearer_auth(&jwt)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = client
        .get(format!(
            "http://{}/api/v1/notifications/unread-count",
            address()
        ))
        .bearer_auth(&jwt)
        .send()
        .await
        .unwrap();
    let unread = response.json::<Value>().await.unwrap();
    assert_eq!(unread["unread_count"], 0);

    let response = client
        .delete(format!("http://{}/api/v1/notifications/{id}", address()))
        .bearer_auth(&jwt)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .delete(format!("http://{}/api/v1/notifications/{id}", address()))
        .bearer_auth(&jwt)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn other_user_connection_gets_nothing() {
    init_env();

    let user_id = random_user_id();
    let other_user_id = random_user_id();
    let service = create_notifications_service().await;

    let (mut ws, _) = tokio_tungstenite::connect_async(ws_url(&encode_jwt(other_user_id)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    service
        .notify_team_deleted("Core", &[user_id])
        .await
        .unwrap();

    let result = timeout(Duration::from_millis(500), async {
        while let Some(Ok(message)) = ws.next().await {
            if let Message::Text(text) = message {
                return Some(text);
            }
        }
        None
    })
    .await;

    assert!(result.is_err() || matches!(result, Ok(None)));
}

#[tokio::test]
#[serial]
async fn invalid_pagination() {
    init_env();

    let client = Client::new();

    for query in ["limit=0", "limit=101", "offset=-1"] {
        let response = client
            .get(format!("http://{}/api/v1/notifications?{query}", address()))
            .bearer_auth(encode_jwt(random_user_id()))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
#[serial]
async fn malformed_notification_id() {
    init_env();

    let client = Client::new();

    let response = client
        .put(format!(
            "http://{}/api/v1/notifications/not-an-id/read",
            address()
        ))
        .bearer_auth(encode_jwt(random_user_id()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
