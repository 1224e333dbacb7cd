//! eYantra API Server
//!
//! REST backend for the lab website: public event/developer listings,
//! the contact form, and the admin API behind cookie/bearer sessions.

use std::net::SocketAddr;

use axum::middleware;
use eyantra_api::{
    config::Config,
    routes::create_router,
    security::{cors_layer, security_headers_middleware},
    state::AppState,
    store::Stores,
};
use eyantra_shared::{create_pool, run_migrations};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    tracing::info!("Starting eYantra API Server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    tracing::info!(
        token_delivery = ?config.token_delivery,
        registration_open = config.enable_registration,
        "Configuration loaded"
    );

    let stores = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections).await?;
            run_migrations(&pool).await?;
            tracing::info!("Database pool created and migrations applied");
            Stores::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set - using the in-memory store, data is lost on restart");
            Stores::in_memory()
        }
    };

    let addr: SocketAddr = config.bind_address.parse()?;
    let cors = cors_layer(&config.allowed_origins);
    let state = AppState::new(config, stores);

    let app = create_router(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` overrides the filter
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,eyantra_api=debug,tower_http=info".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
