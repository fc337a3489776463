use bson::{oid::ObjectId, DateTime};
use serde::Serialize;

#[derive(Serialize)]
pub struct NotificationInsertEntity {
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime,

    ///
    /// Shared by all notifications inserted together
    ///
    pub batch_id: ObjectId,
}
