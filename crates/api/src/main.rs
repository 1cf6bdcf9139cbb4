use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skylark_api::config::ServerConfig;
use skylark_api::router::build_app_router;
use skylark_api::state::AppState;
use skylark_cloud::{S3ObjectStore, SqsQueue};
use skylark_db::PgRecordStore;
use skylark_pipeline::status::JobStatusService;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylark_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = skylark_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    skylark_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    skylark_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    // --- Collaborator handles (constructed once, passed explicitly) ---
    let bucket = std::env::var("ARTIFACT_BUCKET").expect("ARTIFACT_BUCKET must be set");
    let start_queue_url =
        std::env::var("JOB_START_QUEUE_URL").expect("JOB_START_QUEUE_URL must be set");

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let objects = Arc::new(S3ObjectStore::new(
        aws_sdk_s3::Client::new(&aws_config),
        bucket,
    ));
    let start_queue = Arc::new(SqsQueue::new(
        aws_sdk_sqs::Client::new(&aws_config),
        start_queue_url,
    ));
    tracing::info!("Cloud collaborator clients created");

    // --- App state ---
    let state = AppState {
        status: JobStatusService::new(Arc::new(PgRecordStore::new(pool))),
        start_queue,
        objects,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
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
