//! Payrun Engine - Main Entry Point
//! Queue-backed payrun job execution pipeline

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import workspace crates
use payrun_core::application::{
    shutdown_channel, ComputationSettings, EngineRegistry, ExecutionContextFactory, JobQueue,
    Worker,
};
use payrun_core::application::worker::constants::DEFAULT_WORKER_COUNT;
use payrun_core::port::time_provider::SystemTimeProvider;
use payrun_core::port::{NotificationDispatcher, PayrunProcessor, TimeProvider};
use payrun_infra_engine::{
    EnginePayrunProcessor, TracingNotificationDispatcher, WebhookNotificationDispatcher,
};
use payrun_infra_sqlite::{create_pool, run_migrations, SqliteJobStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "~/.payrun/jobs.db";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (JSON format for production)
    let log_format = std::env::var("PAYRUN_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("payrun_core=info,payrun_infra_sqlite=info,payrun_infra_engine=info,payrun_daemon=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Payrun Engine v{} starting...", VERSION);

    // 2. Load configuration
    let db_path = std::env::var("PAYRUN_DB_PATH")
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_DB_PATH).into_owned());

    let worker_count: usize = std::env::var("PAYRUN_WORKER_COUNT")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|count| *count > 0)
        .unwrap_or(DEFAULT_WORKER_COUNT);

    info!(db_path = %db_path, "Initializing database...");

    // 3. Initialize database
    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let job_store = Arc::new(SqliteJobStore::new(pool.clone()));

    let registry = Arc::new(EngineRegistry {
        job_store,
        time_provider: time_provider.clone(),
        settings: ComputationSettings::default(),
    });
    let context_factory = ExecutionContextFactory::new(registry);

    let processor: Arc<dyn PayrunProcessor> = Arc::new(EnginePayrunProcessor::new());

    let dispatcher: Arc<dyn NotificationDispatcher> = match std::env::var("PAYRUN_WEBHOOK_URL") {
        Ok(url) if !url.is_empty() => {
            info!(endpoint = %url, "Webhook notification dispatcher configured");
            Arc::new(WebhookNotificationDispatcher::new(url))
        }
        _ => {
            info!("No webhook endpoint configured, logging notifications");
            Arc::new(TracingNotificationDispatcher)
        }
    };

    let queue = Arc::new(JobQueue::new());

    // 5. Start workers (job processing loops)
    info!(worker_count = %worker_count, "Starting payrun workers...");
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let mut worker_handles = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let worker = Worker::new(
            queue.clone(),
            context_factory.clone(),
            processor.clone(),
            dispatcher.clone(),
            time_provider.clone(),
        );
        let token = shutdown_rx.clone();
        worker_handles.push(tokio::spawn(async move {
            if let Err(e) = worker.run(token).await {
                tracing::error!(error = ?e, "Worker failed");
            }
        }));
    }

    info!("System ready. Waiting for payrun jobs...");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown: in-flight jobs are aborted, queued items stay
    shutdown_tx.shutdown();
    for handle in worker_handles {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete.");

    Ok(())
}
