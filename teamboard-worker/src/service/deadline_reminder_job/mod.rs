mod deadline_reminder_job;

pub use deadline_reminder_job::*;
