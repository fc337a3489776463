mod email_jobs_producer;
mod rabbitmq_email_jobs_producer;

pub use email_jobs_producer::*;
pub use rabbitmq_email_jobs_producer::*;
