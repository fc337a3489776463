use crate::{
    application::{ApplicationMiddleware, ApplicationState, WebSocketUpgradeConfig},
    auth::{JwtDecoder, User},
    dto::{input, output},
    error::Error,
    service::{notifications_service::NotificationsService, websockets_service::WebSocketsService},
};
use axum::{
    extract::{ConnectInfo, Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::Response,
    routing::{delete, get, put},
    Extension, Json, Router,
};
use bson::oid::ObjectId;
use std::{net::SocketAddr, sync::Arc};

pub fn routing(application_middleware: &ApplicationMiddleware) -> Router<ApplicationState> {
    Router::new()
        .route("/api/v1/notifications", get(get_notifications))
        .route(
            "/api/v1/notifications/unread-count",
            get(get_notifications_unread_count),
        )
        .route("/api/v1/notifications/read", put(put_notifications_read))
        .route("/api/v1/notifications/:id/read", put(put_notification_read))
        .route("/api/v1/notifications/:id", delete(delete_notification))
        .route_layer(application_middleware.auth.clone())
        .route("/ws/v1", get(websocket_upgrade))
}

fn parse_id(id: &str) -> Result<ObjectId, Error> {
    ObjectId::parse_str(id).map_err(|_| Error::InvalidId)
}

async fn get_notifications(
    State(service): State<Arc<dyn NotificationsService>>,
    Extension(user): Extension<User>,
    Query(pagination): Query<input::Pagination>,
) -> Result<Json<output::NotificationsPage>, Error> {
    let page = service.find_notifications(user.id, pagination).await?;

    Ok(Json(page))
}

async fn get_notifications_unread_count(
    State(service): State<Arc<dyn NotificationsService>>,
    Extension(user): Extension<User>,
) -> Result<Json<output::UnreadCount>, Error> {
    let unread_count = service.unread_count(user.id).await?;

    Ok(Json(unread_count))
}

async fn put_notifications_read(
    State(service): State<Arc<dyn NotificationsService>>,
    Extension(user): Extension<User>,
) -> Result<StatusCode, Error> {
    service.mark_all_as_read(user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn put_notification_read(
    State(service): State<Arc<dyn NotificationsService>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<StatusCode, Error> {
    let id = parse_id(&id)?;
    service.mark_as_read(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_notification(
    State(service): State<Arc<dyn NotificationsService>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<StatusCode, Error> {
    let id = parse_id(&id)?;
    service.delete_notification(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn authorize_websocket(
    jwt_decoder: &JwtDecoder,
    token: input::WebSocketToken,
) -> Result<User, Error> {
    let token = token.token.ok_or(Error::TokenInvalid("missing token"))?;
    jwt_decoder.decode(&token).map_err(|err| {
        tracing::debug!(%err, "rejected websocket token");
        Error::TokenInvalid("invalid token")
    })
}

async fn websocket_upgrade(
    State(jwt_decoder): State<JwtDecoder>,
    State(websockets_service): State<Arc<dyn WebSocketsService>>,
    State(config): State<WebSocketUpgradeConfig>,
    ConnectInfo(address): ConnectInfo<SocketAddr>,
    Query(token): Query<input::WebSocketToken>,
    ws: WebSocketUpgrade,
) -> Result<Response, Error> {
    let user = authorize_websocket(&jwt_decoder, token)?;

    let response = ws
        .max_message_size(config.max_message_size)
        .on_upgrade(move |websocket| async move {
            websockets_service
                .handle_client(user.id, address, websocket)
                .await;
        });

    Ok(response)
}
