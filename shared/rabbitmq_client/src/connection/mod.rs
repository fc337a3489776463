//!
//! Long-lived RabbitMQ connection that recreates itself after network failures.
//!

mod connection_callback;
mod dto;
mod rabbitmq_connection;
mod state_machine;

pub use dto::RabbitmqConnectionConfig;
pub use rabbitmq_connection::RabbitmqConnection;
