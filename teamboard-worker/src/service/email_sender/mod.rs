mod dto;
mod email_sender;
mod email_templates;
mod error;
mod smtp_email_sender;

pub use dto::*;
pub use email_sender::*;
pub use email_templates::*;
pub use error::*;
pub use smtp_email_sender::*;
