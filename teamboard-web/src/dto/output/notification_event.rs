use serde::{Deserialize, Serialize};

///
/// Push payload. Shared by the relay channel and websocket text frames.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub user_id: i64,
    pub title: String,
    pub content: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn relay_payload_from_other_instance() {
        let payload = r#"{"user_id":42,"title":"Added to Team","content":"You have been added to the team 'Core'."}"#;

        let event = serde_json::from_str::<NotificationEvent>(payload).unwrap();

        assert_eq!(event.user_id, 42);
        assert_eq!(event.title, "Added to Team");
    }

    #[test]
    fn payload_without_user_id_is_rejected() {
        let payload = r#"{"title":"x","content":"y"}"#;

        assert!(serde_json::from_str::<NotificationEvent>(payload).is_err());
    }
}
