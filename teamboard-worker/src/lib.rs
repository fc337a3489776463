//!
//! Background worker of teamboard.
//!
//! Sends emails enqueued on the email jobs queue and runs cron scheduled jobs
//! such as project deadline reminders.
//!

pub mod application;
pub mod repository;
pub mod service;
