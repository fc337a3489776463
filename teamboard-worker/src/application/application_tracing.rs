use super::ApplicationEnv;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Consumer state changes are what the worker is about, connection noise stays at info
const LOG_DIRECTIVES: &str = "warn,teamboard_worker=debug,rabbitmq_client=info,rabbitmq_client::consumer=debug,email_jobs::producer=info";

pub fn setup_tracing(env: &ApplicationEnv) -> anyhow::Result<()> {
    let console_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(rust_log) if !rust_log.trim().is_empty() => log_filter(&rust_log)?,
        _ => log_filter(LOG_DIRECTIVES)?,
    };
    let console_layer = tracing_subscriber::fmt::layer().with_filter(console_filter);

    let file_appender = tracing_appender::rolling::hourly(&env.log_directory, &env.log_filename);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(log_filter(LOG_DIRECTIVES)?);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(())
}

fn log_filter(directives: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::builder()
        .parse(directives)
        .map_err(|err| anyhow::anyhow!("invalid log directives '{directives}': {err}"))
}

#[cfg(test)]
mod test {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn log_filter_default_directives() {
        let filter = log_filter(LOG_DIRECTIVES).unwrap();

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn log_filter_invalid_directives() {
        let result = log_filter("rabbitmq_client::consumer=chatty");

        let err = result.err().unwrap();
        assert!(err.to_string().contains("rabbitmq_client::consumer=chatty"));
    }
}
