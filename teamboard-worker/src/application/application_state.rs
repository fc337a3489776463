use super::ApplicationEnv;
use crate::{
    repository::ProjectsRepositoryImpl,
    service::{
        deadline_reminder_job::DeadlineReminderJob,
        email_jobs_consumer_service::{
            EmailJobsConsumerService, EmailJobsConsumerServiceConfig,
        },
        email_sender::{EmailTemplates, SmtpEmailSender, SmtpEmailSenderConfig},
        scheduler::ScheduledJobRunner,
    },
};
use amqprs::connection::OpenConnectionArguments;
use email_jobs::RabbitmqEmailJobsProducer;
use mongodb::{options::ClientOptions, Client};
use rabbitmq_client::{RabbitmqConnection, RabbitmqConnectionConfig};
use std::sync::Arc;

pub struct ApplicationState {
    pub db_client: Client,
    pub rabbitmq_connection: RabbitmqConnection,
    pub email_jobs_producer: Arc<RabbitmqEmailJobsProducer>,
    pub email_jobs_consumer: EmailJobsConsumerService,
    pub scheduled_job_runner: ScheduledJobRunner,
}

pub async fn create_state(env: &ApplicationEnv) -> anyhow::Result<ApplicationState> {
    tracing::info!("connecting to database");
    let db_client_options = ClientOptions::parse(&env.db_connection_string).await?;
    let db_client = Client::with_options(db_client_options)?;
    let db = db_client.database(&env.db_name);

    tracing::info!("creating repositories");
    let projects_repository = ProjectsRepositoryImpl::new(db);
    let projects_repository = Arc::new(projects_repository);

    tracing::info!("loading email templates");
    let email_templates = EmailTemplates::load(&env.templates_directory)?;
    let email_templates = Arc::new(email_templates);

    let config = SmtpEmailSenderConfig {
        host: env.smtp_host.clone(),
        port: env.smtp_port,
        tls: env.smtp_tls,
        credentials: env.smtp_credentials.clone(),
        sender: env.smtp_sender.clone(),
    };
    let email_sender = SmtpEmailSender::new(config)?;
    let email_sender = Arc::new(email_sender);

    tracing::info!("connecting to rabbitmq");
    let config = RabbitmqConnectionConfig {
        retry_interval: env.rabbitmq_retry_interval,
    };
    let open_connection_args =
        OpenConnectionArguments::try_from(env.rabbitmq_connection_string.as_str())?;
    let rabbitmq_connection = RabbitmqConnection::new(config, open_connection_args).await?;

    let email_jobs_producer = RabbitmqEmailJobsProducer::new(
        rabbitmq_connection.clone(),
        env.rabbitmq_publish_timeout,
    );
    let email_jobs_producer = Arc::new(email_jobs_producer);

    tracing::info!("starting email jobs consumer");
    let config = EmailJobsConsumerServiceConfig {
        redelivery_delay: env.email_jobs_redelivery_delay,
    };
    let email_jobs_consumer = EmailJobsConsumerService::new(
        config,
        rabbitmq_connection.clone(),
        email_templates,
        email_sender,
    )
    .await?;

    tracing::info!("scheduling jobs");
    let deadline_reminder_job = DeadlineReminderJob::new(
        projects_repository,
        email_jobs_producer.clone(),
        env.deadline_reminder_window_days,
    );
    let mut scheduled_job_runner = ScheduledJobRunner::new();
    scheduled_job_runner.schedule(
        &env.deadline_reminder_schedule,
        Arc::new(deadline_reminder_job),
    )?;

    Ok(ApplicationState {
        db_client,
        rabbitmq_connection,
        email_jobs_producer,
        email_jobs_consumer,
        scheduled_job_runner,
    })
}
