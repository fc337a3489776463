mod dto;
mod email_job_handler;
mod email_jobs_consumer_service;

pub use dto::*;
pub use email_job_handler::*;
pub use email_jobs_consumer_service::*;
