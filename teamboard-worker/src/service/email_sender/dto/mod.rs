mod smtp_email_sender_config;

pub use smtp_email_sender_config::*;
