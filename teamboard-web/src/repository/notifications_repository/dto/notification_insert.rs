#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationInsert {
    pub user_id: i64,
    pub title: String,
    pub content: String,
}
