mod error;
mod notification_relay;
mod redis_notification_relay;
mod relay_subscriber;

pub use error::*;
pub use notification_relay::*;
pub use redis_notification_relay::*;
pub use relay_subscriber::*;

///
/// Channel shared by every application instance
///
pub const USER_NOTIFICATIONS_CHANNEL: &str = "user_notifications";
