use serde::Deserialize;

#[derive(Deserialize)]
pub struct WebSocketToken {
    pub token: Option<String>,
}
