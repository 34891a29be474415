use std::sync::Arc;

use anyhow::Context;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use moodjournal_api::config::Config;
use moodjournal_api::db::{self, MemoryStore, PgStore};
use moodjournal_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodjournal_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env()?;

    let state = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::pool::create_pool(url).await?;
            let store = PgStore::new(pool);
            store
                .migrate()
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
            AppState::new(Arc::new(store), config.clone())
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            AppState::new(Arc::new(MemoryStore::new()), config.clone())
        }
    };

    let mut allowed_origins = vec![config
        .frontend_url
        .parse::<axum::http::HeaderValue>()
        .context("FRONTEND_URL is not a valid origin")?];
    for origin in &config.cors_extra_origins {
        match origin.parse::<axum::http::HeaderValue>() {
            Ok(hv) => allowed_origins.push(hv),
            Err(_) => tracing::warn!(origin = %origin, "Ignoring invalid CORS origin"),
        }
    }

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ]);

    let app = build_router(state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    // Client IPs feed the auth rate limiter.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
