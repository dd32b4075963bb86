use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};

use menu_api::{build_router, AppState};
use menu_core::domain::TreeLimits;
use menu_core::repositories::MenuStore;
use menu_infrastructure::{create_pool, run_migrations, MemoryMenuStore, PgMenuStore};
use menu_shared::config::{AppConfig, StorageBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (.env included)
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry
    menu_shared::telemetry::init_telemetry(&config.logging)?;

    info!("{} starting ({})...", config.app.name, config.app.env);

    let store = open_store(&config).await?;

    let state = AppState::new(
        store,
        TreeLimits {
            max_items: config.limits.max_items,
            max_depth: config.limits.max_depth,
        },
    );
    let app = build_router(state, &config.limits);

    // Bind address
    let host: std::net::IpAddr = config
        .app
        .host
        .parse()
        .with_context(|| format!("invalid app.host {}", config.app.host))?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn MenuStore>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&config.database)
                .await
                .context("failed to connect to database")?;
            if config.database.run_migrations {
                run_migrations(&pool).await.context("failed to run migrations")?;
            }
            info!("Database connection established.");
            Ok(Arc::new(PgMenuStore::new(pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryMenuStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
