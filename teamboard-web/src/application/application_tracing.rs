use super::ApplicationEnv;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Service at debug, shared job queue libraries at info, everything else at warn
const LOG_DIRECTIVES: &str =
    "warn,teamboard_web=debug,tower_http=debug,rabbitmq_client=info,email_jobs::producer=info";

///
/// Log file always uses [LOG_DIRECTIVES], `RUST_LOG` only overrides console output
///
pub fn setup_tracing(env: &ApplicationEnv) -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let console_layer = tracing_subscriber::fmt::layer()
        .with_filter(console_filter(rust_log.as_deref())?);

    let file_appender = tracing_appender::rolling::hourly(&env.log_directory, &env.log_filename);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::builder().parse(LOG_DIRECTIVES)?);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(())
}

fn console_filter(rust_log: Option<&str>) -> anyhow::Result<EnvFilter> {
    let directives = match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ => LOG_DIRECTIVES,
    };

    Ok(EnvFilter::builder().parse(directives)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn console_filter_defaults() {
        let filter = console_filter(None).unwrap();

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn console_filter_blank_rust_log_uses_defaults() {
        let filter = console_filter(Some("  ")).unwrap();

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn console_filter_rust_log_overrides_defaults() {
        let filter = console_filter(Some("error,rabbitmq_client::publisher=warn")).unwrap();

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn console_filter_invalid_rust_log() {
        let result = console_filter(Some("teamboard_web=loud"));

        assert!(result.is_err());
    }
}
