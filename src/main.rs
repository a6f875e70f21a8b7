// feedback-report-service/src/main.rs

use feedback_report_service::config::Config;
use feedback_report_service::persistence::PgStore;
use feedback_report_service::pipeline::ReportPipeline;
use feedback_report_service::routes::{router, AppState};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Print to stderr BEFORE logging initialization to catch early failures
    eprintln!("Starting feedback-report-service...");

    // Load configuration
    let config = match Config::load() {
        Ok(cfg) => {
            eprintln!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            eprintln!("FATAL: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    eprintln!("Initializing logging...");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.service.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    eprintln!("Logging initialized");

    info!(
        service = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        templates = %config.templates.path,
        "Starting Feedback Report Service"
    );

    // Connect to PostgreSQL
    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => {
            eprintln!("Database pool created successfully");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            eprintln!("FATAL: Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let store = Arc::new(PgStore::new(pool));
    let pipeline = ReportPipeline::new(store.clone(), store, &config);
    let app = router(AppState { pipeline });

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&address).await?;
    info!(address = %address, "Server listening");

    let cancel = CancellationToken::new();
    tokio::spawn(watch_signals(cancel.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn watch_signals(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Unable to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Unable to listen for SIGTERM: {}", err);
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

    info!("Received shutdown signal, draining connections");
    cancel.cancel();
}
