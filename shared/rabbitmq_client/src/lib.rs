pub mod connection;
pub mod consumer;
pub mod publisher;
mod retry;

pub use connection::{RabbitmqConnection, RabbitmqConnectionConfig};
pub use consumer::{
    DeliveryHandler, HandlerError, RabbitmqConsumerStatus, RabbitmqConsumerStatusChangeCallback,
    RabbitmqQueueConsumer, RabbitmqQueueConsumerConfig,
};
pub use publisher::{PublishError, RabbitmqQueuePublisher, RabbitmqQueuePublisherConfig};
