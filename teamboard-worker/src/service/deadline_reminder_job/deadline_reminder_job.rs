use crate::{repository::ProjectsRepository, service::scheduler::ScheduledJob};
use anyhow::Context;
use async_trait::async_trait;
use email_jobs::{EmailJobsProducer, ProjectDeadlineReminderEmail};
use std::sync::Arc;
use time::{macros::format_description, Date, Duration, OffsetDateTime};

///
/// Enqueues reminder email for every member of every project
/// whose end date falls within `today..=today + window_days`
///
pub struct DeadlineReminderJob {
    projects_repository: Arc<dyn ProjectsRepository>,
    email_jobs_producer: Arc<dyn EmailJobsProducer>,
    window_days: u32,
}

impl DeadlineReminderJob {
    pub fn new(
        projects_repository: Arc<dyn ProjectsRepository>,
        email_jobs_producer: Arc<dyn EmailJobsProducer>,
        window_days: u32,
    ) -> Self {
        Self {
            projects_repository,
            email_jobs_producer,
            window_days,
        }
    }

    async fn remind(&self, today: Date) -> anyhow::Result<()> {
        let until = today + Duration::days(self.window_days.into());
        let projects = self
            .projects_repository
            .find_due_between(today, until)
            .await
            .context("failed to find projects near deadline")?;
        tracing::info!(projects = projects.len(), %today, %until, "found projects near deadline");

        let mut enqueued = 0;
        let mut failed = 0;
        for project in projects {
            let due_date = project
                .end_date
                .format(format_description!("[year]-[month]-[day]"))?;

            for member in project.members {
                let data = ProjectDeadlineReminderEmail {
                    user_name: member.name,
                    project_name: project.name.clone(),
                    due_date: due_date.clone(),
                };

                let result = email_jobs::send_project_deadline_reminder_email(
                    self.email_jobs_producer.as_ref(),
                    &member.email,
                    &data,
                )
                .await;

                match result {
                    Ok(()) => enqueued += 1,
                    Err(err) => {
                        failed += 1;
                        tracing::warn!(project = %project.name, %err, "failed to enqueue reminder");
                    }
                }
            }
        }

        tracing::info!(enqueued, failed, "reminders enqueued");

        Ok(())
    }
}

#[async_trait]
impl ScheduledJob for DeadlineReminderJob {
    fn name(&self) -> &'static str {
        "RemindProjectDeadlines"
    }

    async fn run(&self) -> anyhow::Result<()> {
        self.remind(OffsetDateTime::now_utc().date()).await
    }
}
