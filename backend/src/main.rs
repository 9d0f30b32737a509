//! Cold Storage Inventory - Backend Server

use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cold_storage_backend::{
    config::Config,
    create_app,
    external::S3ObjectStorage,
    scheduler,
    services::{PgSnapshotStore, ReportIndexService, SnapshotService, SnapshotSettings, StockService},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cs_server=debug,cold_storage_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Cold Storage Inventory Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let storage = S3ObjectStorage::new(&config.storage);
    tracing::info!(
        endpoint = %config.storage.endpoint,
        bucket = %config.storage.bucket,
        "Object storage configured"
    );

    let snapshots = Arc::new(SnapshotService::new(
        Arc::new(StockService::new(db_pool.clone())),
        Arc::new(PgSnapshotStore::new(db_pool.clone())),
        Arc::new(storage),
        Arc::new(ReportIndexService::new(db_pool.clone())),
        SnapshotSettings::from_config(&config),
    ));

    // Keep the scheduler handle alive for the lifetime of the server
    let _scheduler = scheduler::start(&config.report, Arc::clone(&snapshots)).await?;

    // Create application state
    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
        snapshots,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
