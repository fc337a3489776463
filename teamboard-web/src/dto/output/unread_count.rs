use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread_count: u64,
}
