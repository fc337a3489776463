use crate::repository;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] repository::Error),

    #[error("validation error: {0}")]
    Validation(&'static str),

    #[error("invalid notification id")]
    InvalidId,

    #[error("notification does not exist")]
    NotificationNotExist,

    #[error("websocket token invalid: {0}")]
    TokenInvalid(&'static str),

    ///
    /// This error should be returned only in situations
    /// that should never occur when system is setup correctly.
    ///
    #[error("unexpected error: {0}")]
    UnexpectedError(#[from] anyhow::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::warn!(err = %self);

        match self {
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::InvalidId => StatusCode::BAD_REQUEST,
            Error::NotificationNotExist => StatusCode::NOT_FOUND,
            Error::TokenInvalid(_) => StatusCode::UNAUTHORIZED,
            Error::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
        .into_response()
    }
}
