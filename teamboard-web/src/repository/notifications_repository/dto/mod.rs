mod notification;
mod notification_insert;

pub use notification::*;
pub use notification_insert::*;
