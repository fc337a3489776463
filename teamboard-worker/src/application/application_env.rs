use anyhow::anyhow;
use std::{path::PathBuf, time::Duration};

pub struct ApplicationEnv {
    pub log_directory: String,
    pub log_filename: String,

    pub db_connection_string: String,
    pub db_name: String,

    pub rabbitmq_connection_string: String,
    pub rabbitmq_retry_interval: Duration,
    pub rabbitmq_publish_timeout: Duration,

    pub email_jobs_redelivery_delay: Duration,

    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_tls: bool,
    /// Username and password
    pub smtp_credentials: Option<(String, String)>,
    pub smtp_sender: String,

    pub templates_directory: PathBuf,

    /// Six field cron expression, with seconds
    pub deadline_reminder_schedule: String,
    pub deadline_reminder_window_days: u32,
}

impl ApplicationEnv {
    pub fn parse() -> anyhow::Result<Self> {
        let log_directory = Self::env_var("TEAMBOARD_WORKER_LOG_DIRECTORY")?;
        let log_filename = Self::env_var("TEAMBOARD_WORKER_LOG_FILENAME")?;
        let db_connection_string = Self::env_var("TEAMBOARD_WORKER_DB_CONNECTION_STRING")?;
        let db_name = Self::env_var("TEAMBOARD_WORKER_DB_NAME")?;
        let rabbitmq_connection_string =
            Self::env_var("TEAMBOARD_WORKER_RABBITMQ_CONNECTION_STRING")?;
        let rabbitmq_retry_interval = Self::env_secs("TEAMBOARD_WORKER_RABBITMQ_RETRY_INTERVAL")?;
        let rabbitmq_publish_timeout =
            Self::env_secs("TEAMBOARD_WORKER_RABBITMQ_PUBLISH_TIMEOUT")?;
        let email_jobs_redelivery_delay = Duration::from_secs(
            Self::env_var_or("TEAMBOARD_WORKER_EMAIL_JOBS_REDELIVERY_DELAY", "5").parse()?,
        );
        let smtp_host = Self::env_var("TEAMBOARD_WORKER_SMTP_HOST")?;
        let smtp_port = Self::env_var_or("TEAMBOARD_WORKER_SMTP_PORT", "1025").parse()?;
        let smtp_tls = Self::env_var_or("TEAMBOARD_WORKER_SMTP_TLS", "false").parse()?;
        let smtp_username = std::env::var("TEAMBOARD_WORKER_SMTP_USERNAME").ok();
        let smtp_password = std::env::var("TEAMBOARD_WORKER_SMTP_PASSWORD").ok();
        let smtp_credentials = match (smtp_username, smtp_password) {
            (Some(username), Some(password)) => Some((username, password)),
            (None, None) => None,
            _ => {
                return Err(anyhow!(
                    "TEAMBOARD_WORKER_SMTP_USERNAME and TEAMBOARD_WORKER_SMTP_PASSWORD must be set together"
                ))
            }
        };
        let smtp_sender = Self::env_var("TEAMBOARD_WORKER_SMTP_SENDER")?;
        let templates_directory =
            Self::env_var_or("TEAMBOARD_WORKER_TEMPLATES_DIRECTORY", "templates/emails").into();
        let deadline_reminder_schedule =
            Self::env_var_or("TEAMBOARD_WORKER_DEADLINE_REMINDER_SCHEDULE", "0 0 8 * * *");
        let deadline_reminder_window_days =
            Self::env_var_or("TEAMBOARD_WORKER_DEADLINE_REMINDER_WINDOW_DAYS", "3").parse()?;

        Ok(Self {
            log_directory,
            log_filename,
            db_connection_string,
            db_name,
            rabbitmq_connection_string,
            rabbitmq_retry_interval,
            rabbitmq_publish_timeout,
            email_jobs_redelivery_delay,
            smtp_host,
            smtp_port,
            smtp_tls,
            smtp_credentials,
            smtp_sender,
            templates_directory,
            deadline_reminder_schedule,
            deadline_reminder_window_days,
        })
    }

    fn env_var(name: &'static str) -> anyhow::Result<String> {
        std::env::var(name).map_err(|_| anyhow!("environment variable {name} not set"))
    }

    fn env_var_or(name: &'static str, default: &str) -> String {
        std::env::var(name).unwrap_or_else(|_| default.to_string())
    }

    fn env_secs(name: &'static str) -> anyhow::Result<Duration> {
        let secs = Self::env_var(name)?
            .parse()
            .map_err(|err| anyhow!("environment variable {name} is not a number of seconds: {err}"))?;

        Ok(Duration::from_secs(secs))
    }
}
