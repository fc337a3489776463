pub mod deadline_reminder_job;
pub mod email_jobs_consumer_service;
pub mod email_sender;
pub mod scheduler;
