mod rabbitmq_consumer_status;
mod rabbitmq_queue_consumer_config;

pub use rabbitmq_consumer_status::*;
pub use rabbitmq_queue_consumer_config::*;
