use super::super::entity::NotificationFindEntity;
use bson::oid::ObjectId;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: ObjectId,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}

impl From<NotificationFindEntity> for Notification {
    fn from(value: NotificationFindEntity) -> Self {
        Self {
            id: value._id,
            user_id: value.user_id,
            title: value.title,
            content: value.content,
            is_read: value.is_read,
            created_at: value.created_at.to_time_0_3(),
        }
    }
}
