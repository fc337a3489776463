//!
//! Publishing persistent messages to a single durable queue.
//!

mod dto;
mod error;
mod publisher_channel;
mod publisher_channel_callback;
mod rabbitmq_queue_publisher;

pub use dto::RabbitmqQueuePublisherConfig;
pub use error::PublishError;
pub use rabbitmq_queue_publisher::RabbitmqQueuePublisher;
