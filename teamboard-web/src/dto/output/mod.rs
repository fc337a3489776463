mod notification;
mod notification_event;
mod notifications_page;
mod unread_count;

pub use notification::*;
pub use notification_event::*;
pub use notifications_page::*;
pub use unread_count::*;
