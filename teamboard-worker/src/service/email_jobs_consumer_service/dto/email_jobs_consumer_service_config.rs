use std::time::Duration;

pub struct EmailJobsConsumerServiceConfig {
    pub redelivery_delay: Duration,
}
