use crate::{
    EmailJob, EmailJobsError, EmailJobsProducer, EmailTemplate, ProjectDeadlineReminderEmail,
    ProjectMembershipEmail, TeamMembershipEmail,
};
use serde::Serialize;

async fn enqueue<T>(
    producer: &dyn EmailJobsProducer,
    to: &str,
    template: EmailTemplate,
    subject_name: &str,
    data: &T,
) -> Result<(), EmailJobsError>
where
    T: Serialize,
{
    let job = EmailJob::new(to, template.subject(subject_name), template, data)?;
    producer.publish(job).await
}

pub async fn send_team_join_email(
    producer: &dyn EmailJobsProducer,
    to: &str,
    data: &TeamMembershipEmail,
) -> Result<(), EmailJobsError> {
    enqueue(producer, to, EmailTemplate::TeamJoin, &data.team_name, data).await
}

pub async fn send_team_leave_email(
    producer: &dyn EmailJobsProducer,
    to: &str,
    data: &TeamMembershipEmail,
) -> Result<(), EmailJobsError> {
    enqueue(producer, to, EmailTemplate::TeamLeave, &data.team_name, data).await
}

pub async fn send_project_join_email(
    producer: &dyn EmailJobsProducer,
    to: &str,
    data: &ProjectMembershipEmail,
) -> Result<(), EmailJobsError> {
    enqueue(producer, to, EmailTemplate::ProjectJoin, &data.project_name, data).await
}

pub async fn send_project_leave_email(
    producer: &dyn EmailJobsProducer,
    to: &str,
    data: &ProjectMembershipEmail,
) -> Result<(), EmailJobsError> {
    enqueue(producer, to, EmailTemplate::ProjectLeave, &data.project_name, data).await
}

pub async fn send_project_deadline_reminder_email(
    producer: &dyn EmailJobsProducer,
    to: &str,
    data: &ProjectDeadlineReminderEmail,
) -> Result<(), EmailJobsError> {
    enqueue(
        producer,
        to,
        EmailTemplate::ProjectDeadlineReminder,
        &data.project_name,
        data,
    )
    .await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::producer::MockEmailJobsProducer;
    use mockall::predicate;
    use serde_json::json;

    #[tokio::test]
    async fn deadline_reminder_job() {
        let expected = EmailJob {
            to: "bob@example.com".to_string(),
            subject: "Project Reminder: Apollo is due soon".to_string(),
            template_name: "project_deadline_reminder.html".to_string(),
            data: json!({
                "user_name": "Bob",
                "project_name": "Apollo",
                "due_date": "2026-10-18",
            }),
        };

        let mut producer = MockEmailJobsProducer::new();
        producer
            .expect_publish()
            .with(predicate::eq(expected))
            .times(1)
            .returning(|_| Ok(()));

        let data = ProjectDeadlineReminderEmail {
            user_name: "Bob".to_string(),
            project_name: "Apollo".to_string(),
            due_date: "2026-10-18".to_string(),
        };
        let result = send_project_deadline_reminder_email(&producer, "bob@example.com", &data).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn publish_error_is_returned() {
        let mut producer = MockEmailJobsProducer::new();
        producer.expect_publish().times(1).returning(|_| {
            Err(EmailJobsError::Publish(
                rabbitmq_client::PublishError::ConnectionUnavailable,
            ))
        });

        let data = TeamMembershipEmail {
            user_name: "Alice".to_string(),
            team_name: "Core".to_string(),
        };
        let result = send_team_leave_email(&producer, "alice@example.com", &data).await;

        assert!(matches!(result, Err(EmailJobsError::Publish(_))));
    }
}
