use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use shiftgate_core::ports::SystemClock;
use shiftgate_store::postgres::{PostgresConfig, PostgresStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shiftgate_api::{create_router, ApiConfig, AppState, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "shiftgate_api=info,shiftgate_attendance=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();
    let settings = config.load_layered().context("Failed to load shiftgate configuration")?;

    tracing::info!(
        port = config.port,
        postgres = config.uses_postgres(),
        settings = ?settings.to_inspection_map(),
        "Starting Shiftgate API server"
    );

    let stores = if config.uses_postgres() {
        tracing::info!("DATABASE_URL found, connecting to PostgreSQL...");
        let store = init_postgres_storage().await.context(
            "Failed to connect to PostgreSQL. Ensure PostgreSQL is running, \
             DATABASE_URL is correct and the database exists",
        )?;
        tracing::info!("Connected to PostgreSQL");
        Stores::postgres(store)
    } else {
        tracing::info!("Using in-memory storage (set DATABASE_URL for PostgreSQL)");
        Stores::memory()
    };

    let state = Arc::new(AppState::new(stores, &settings, Arc::new(SystemClock)));

    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid SHIFTGATE_CORS_ORIGIN '{}'", config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = create_router(state).layer(cors).layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", config.cors_origin);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Pool settings come from DATABASE_URL and the SHIFTGATE_DB_* variables
async fn init_postgres_storage() -> anyhow::Result<Arc<PostgresStore>> {
    let config = PostgresConfig::from_env().context("Invalid database settings")?;
    let store = PostgresStore::with_migrations(config).await?;
    Ok(Arc::new(store))
}
