use crate::repository;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: String,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<repository::Notification> for Notification {
    fn from(value: repository::Notification) -> Self {
        Self {
            id: value.id.to_hex(),
            user_id: value.user_id,
            title: value.title,
            content: value.content,
            is_read: value.is_read,
            created_at: value.created_at,
        }
    }
}
