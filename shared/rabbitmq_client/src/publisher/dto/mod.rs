mod publisher_confirm;
mod rabbitmq_queue_publisher_config;

pub use publisher_confirm::*;
pub use rabbitmq_queue_publisher_config::*;
