use crate::auth::{parse_jwt_algorithms, parse_jwt_key};
use anyhow::anyhow;
use jsonwebtoken::{Algorithm, DecodingKey};
use std::{net::SocketAddr, time::Duration};

pub struct ApplicationEnv {
    pub log_directory: String,
    pub log_filename: String,

    pub bind_address: SocketAddr,

    pub db_connection_string: String,
    pub db_name: String,

    /// Algorithms must belong to the same family
    pub jwt_algorithms: Vec<Algorithm>,
    pub jwt_key: DecodingKey,

    pub rabbitmq_connection_string: String,
    pub rabbitmq_retry_interval: Duration,
    pub rabbitmq_publish_timeout: Duration,

    pub redis_connection_string: String,
    pub redis_operation_timeout: Duration,

    pub websocket_ping_interval: Duration,
    pub websocket_idle_timeout: Duration,
    pub websocket_write_timeout: Duration,
    pub websocket_connection_buffer_size: usize,
    pub websocket_max_message_size: usize,
}

impl ApplicationEnv {
    pub fn parse() -> anyhow::Result<Self> {
        let log_directory = Self::env_var("TEAMBOARD_WEB_LOG_DIRECTORY")?;
        let log_filename = Self::env_var("TEAMBOARD_WEB_LOG_FILENAME")?;
        let bind_address = Self::env_var("TEAMBOARD_WEB_BIND_ADDRESS")?.parse()?;
        let db_connection_string = Self::env_var("TEAMBOARD_WEB_DB_CONNECTION_STRING")?;
        let db_name = Self::env_var("TEAMBOARD_WEB_DB_NAME")?;
        let jwt_algorithms = parse_jwt_algorithms(Self::env_var("TEAMBOARD_WEB_JWT_ALGORITHMS")?)?;
        let jwt_algorithm = jwt_algorithms.first().ok_or(anyhow!(
            "TEAMBOARD_WEB_JWT_ALGORITHMS need to contain at least one algorithm"
        ))?;
        let jwt_key = parse_jwt_key(jwt_algorithm, Self::env_var("TEAMBOARD_WEB_JWT_KEY")?)?;
        let rabbitmq_connection_string =
            Self::env_var("TEAMBOARD_WEB_RABBITMQ_CONNECTION_STRING")?;
        let rabbitmq_retry_interval = Self::env_secs("TEAMBOARD_WEB_RABBITMQ_RETRY_INTERVAL")?;
        let rabbitmq_publish_timeout =
            Self::env_secs("TEAMBOARD_WEB_RABBITMQ_PUBLISH_TIMEOUT")?;
        let redis_connection_string = Self::env_var("TEAMBOARD_WEB_REDIS_CONNECTION_STRING")?;
        let redis_operation_timeout = Self::env_secs("TEAMBOARD_WEB_REDIS_OPERATION_TIMEOUT")?;
        let websocket_ping_interval = Self::env_secs("TEAMBOARD_WEB_WEBSOCKET_PING_INTERVAL")?;
        let websocket_idle_timeout = Self::env_secs("TEAMBOARD_WEB_WEBSOCKET_IDLE_TIMEOUT")?;
        let websocket_write_timeout = Self::env_secs("TEAMBOARD_WEB_WEBSOCKET_WRITE_TIMEOUT")?;
        let websocket_connection_buffer_size =
            Self::env_var("TEAMBOARD_WEB_WEBSOCKET_CONNECTION_BUFFER_SIZE")?.parse()?;
        let websocket_max_message_size =
            Self::env_var("TEAMBOARD_WEB_WEBSOCKET_MAX_MESSAGE_SIZE")?.parse()?;

        if websocket_ping_interval >= websocket_idle_timeout {
            return Err(anyhow!(
                "TEAMBOARD_WEB_WEBSOCKET_PING_INTERVAL must be shorter than TEAMBOARD_WEB_WEBSOCKET_IDLE_TIMEOUT"
            ));
        }

        if websocket_connection_buffer_size == 0 {
            return Err(anyhow!(
                "TEAMBOARD_WEB_WEBSOCKET_CONNECTION_BUFFER_SIZE must be greater than 0"
            ));
        }

        Ok(Self {
            log_directory,
            log_filename,
            bind_address,
            db_connection_string,
            db_name,
            jwt_algorithms,
            jwt_key,
            rabbitmq_connection_string,
            rabbitmq_retry_interval,
            rabbitmq_publish_timeout,
            redis_connection_string,
            redis_operation_timeout,
            websocket_ping_interval,
            websocket_idle_timeout,
            websocket_write_timeout,
            websocket_connection_buffer_size,
            websocket_max_message_size,
        })
    }

    fn env_var(name: &'static str) -> anyhow::Result<String> {
        std::env::var(name).map_err(|_| anyhow!("environment variable {name} not set"))
    }

    fn env_secs(name: &'static str) -> anyhow::Result<Duration> {
        let secs = Self::env_var(name)?
            .parse()
            .map_err(|err| anyhow!("environment variable {name} is not a number of seconds: {err}"))?;

        Ok(Duration::from_secs(secs))
    }
}
