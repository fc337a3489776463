//!
//! Running jobs on cron schedules, each on its own task.
//!

mod clock;
mod error;
mod scheduled_job;
mod scheduled_job_runner;

pub use error::*;
pub use scheduled_job::*;
pub use scheduled_job_runner::*;
