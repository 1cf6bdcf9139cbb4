use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skylark_cloud::{S3ObjectStore, SqsQueue};
use skylark_db::PgRecordStore;
use skylark_pipeline::dispatch::Dispatcher;
use skylark_pipeline::process::UnitProcessor;
use skylark_pipeline::source::HttpStationSource;
use skylark_pipeline::status::JobStatusService;
use skylark_worker::config::WorkerConfig;
use skylark_worker::consumer::run_consumer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylark_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    tracing::info!(
        source = %config.station_source_url,
        bucket = %config.artifact_bucket,
        "Loaded worker configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = skylark_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    skylark_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database ready");

    // --- Collaborator handles (constructed once, passed explicitly) ---
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let s3 = aws_sdk_s3::Client::new(&aws_config);
    let sqs = aws_sdk_sqs::Client::new(&aws_config);

    let objects = Arc::new(S3ObjectStore::new(s3, config.artifact_bucket.clone()));
    let start_queue = Arc::new(SqsQueue::new(sqs.clone(), config.start_queue_url.clone()));
    let unit_queue = Arc::new(SqsQueue::new(sqs, config.unit_queue_url.clone()));

    let status = JobStatusService::new(Arc::new(PgRecordStore::new(pool)));

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(HttpStationSource::new(
            reqwest::Client::new(),
            config.station_source_url.clone(),
        )),
        status.clone(),
        unit_queue.clone(),
    ));
    let processor = Arc::new(UnitProcessor::new(objects, status));

    // --- Consumer loops ---
    let cancel = CancellationToken::new();

    let dispatch_handle = tokio::spawn(run_consumer(
        "dispatcher",
        start_queue,
        dispatcher,
        config.poll_interval,
        cancel.clone(),
    ));
    let unit_handle = tokio::spawn(run_consumer(
        "unit-processor",
        unit_queue,
        processor,
        config.poll_interval,
        cancel.clone(),
    ));

    tracing::info!("Worker started");

    shutdown_signal().await;
    cancel.cancel();

    let _ = dispatch_handle.await;
    let _ = unit_handle.await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
