use super::ApplicationState;
use std::sync::Arc;

pub async fn close(state: ApplicationState) {
    tracing::info!("closing scheduled jobs");
    state.scheduled_job_runner.close().await;

    tracing::info!("closing email jobs consumer");
    state.email_jobs_consumer.close().await;

    tracing::info!("closing email jobs producer");
    match Arc::try_unwrap(state.email_jobs_producer) {
        Ok(email_jobs_producer) => email_jobs_producer.close().await,
        Err(_) => tracing::error!("cannot close email jobs producer, it's still in use"),
    }

    tracing::info!("closing rabbitmq connection");
    state.rabbitmq_connection.close().await;

    tracing::info!("closing connection with database");
    state.db_client.shutdown().await;
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("starting shutdown");
}
