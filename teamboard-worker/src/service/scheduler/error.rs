#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid schedule '{expression}': {source}")]
    InvalidSchedule {
        expression: String,
        source: cron::error::Error,
    },
}
