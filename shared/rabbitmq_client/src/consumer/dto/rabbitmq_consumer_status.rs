#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RabbitmqConsumerStatus {
    Consuming,
    Recovering,
}
