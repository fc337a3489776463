//!
//! Consuming a single durable queue with manual acknowledgement.
//!

mod consumer_channel_callback;
mod delivery;
mod dto;
mod rabbitmq_queue_consumer;
mod state_machine;
mod status_change_callback;

pub use delivery::{DeliveryHandler, HandlerError};
pub use dto::{RabbitmqConsumerStatus, RabbitmqQueueConsumerConfig};
pub use rabbitmq_queue_consumer::RabbitmqQueueConsumer;
pub use status_change_callback::RabbitmqConsumerStatusChangeCallback;
