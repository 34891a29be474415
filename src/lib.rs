use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod query;
pub mod stats;

use auth::rate_limit::RateLimitState;
use config::Config;
use db::{MoodStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub moods: Arc<dyn MoodStore>,
    pub users: Arc<dyn UserStore>,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, config: Config) -> Self
    where
        S: MoodStore + UserStore + 'static,
    {
        Self {
            moods: store.clone(),
            users: store,
            config: Arc::new(config),
            rate_limiter: RateLimitState::new(),
        }
    }
}

/// All routes with auth and rate limiting applied. CORS and tracing layers
/// are added by the binary.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route(
            "/api/moods",
            get(handlers::moods::list_moods).post(handlers::moods::create_mood),
        )
        .route("/api/moods/stats", get(handlers::stats::get_stats))
        .route(
            "/api/moods/:id",
            get(handlers::moods::get_mood)
                .put(handlers::moods::update_mood)
                .delete(handlers::moods::delete_mood),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
