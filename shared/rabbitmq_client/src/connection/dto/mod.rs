mod rabbitmq_connection_config;

pub use rabbitmq_connection_config::*;
