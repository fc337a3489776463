mod email_jobs_consumer_service_config;

pub use email_jobs_consumer_service_config::*;
