//!
//! Contract of the email jobs queue shared by job producers and the worker.
//!

pub mod dto;
pub mod error;
pub mod producer;
mod send;

pub use dto::{
    EmailJob, EmailTemplate, ProjectDeadlineReminderEmail, ProjectMembershipEmail,
    TeamMembershipEmail,
};
pub use error::EmailJobsError;
pub use producer::{EmailJobsProducer, RabbitmqEmailJobsProducer};
pub use send::*;

///
/// Name of the durable queue carrying [EmailJob]s
///
pub const EMAIL_QUEUE: &str = "email_queue";
