use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn, error};
use csv_summary::{
    config::Config,
    db::{self, PgSummaryStore},
    history::{InMemorySummaryStore, SummaryStore},
    routes::create_router,
    utils::init_logger,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    info!("Configuration loaded: {:?}", config.server);

    let store: Arc<dyn SummaryStore> = if config.database.url.is_some() {
        // Connect to database
        let pool = db::create_pool(&config.database).await?;

        info!("Running database migrations...");
        db::run_migrations(&pool).await?;
        info!("Database migrations completed");

        Arc::new(PgSummaryStore::new(pool))
    } else {
        warn!("DATABASE_URL not set, upload history is kept in memory");
        Arc::new(InMemorySummaryStore::new())
    };

    // Create shared state
    let state = csv_summary::AppState::new(store, config.clone());

    // Create router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", err);
        return;
    }
    info!("Ctrl+C received, shutting down...");
}
