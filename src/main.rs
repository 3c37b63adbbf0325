mod models;
mod handlers;
mod store;
mod view;
mod middleware;
mod config;
mod errors;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};
use tower_sessions::cookie::SameSite;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::{
    config::Config,
    store::{RedisStorage, UserStore},
};
use tracing_subscriber;

#[tokio::main]
async fn main() {
    // Initialize basic tracing subscriber
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::load().expect("Failed to load configuration");
    let config_state = config.clone();

    // Initialize Redis client
    let redis_client = Arc::new(
        redis::Client::open(config.redis.url).expect("Failed to connect to Redis"),
    );

    // Initialize the user store behind its Redis storage port and restore
    // the persisted collection (seeding the default admin on first run)
    let user_store = UserStore::new(Arc::new(RedisStorage::new(redis_client)));
    user_store.load().await;

    // Session store setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_name("session");

    // Create router with all routes
    let app = Router::new()
        // Auth routes
        .route("/", get(handlers::serve_login_page))
        .route("/login", post(handlers::handle_login))
        .route("/logout", get(handlers::handle_logout))

        // User management routes
        .route("/users", get(handlers::serve_users_page))
        .route("/users/add", post(handlers::add_user))
        .route("/users/delete/:user_id", get(handlers::delete_user))
        .route("/users/archive/:user_id", get(handlers::archive_user))

        // Profile routes
        .route("/users/:user_id", get(handlers::serve_profile_page))
        .route("/users/:user_id/profile", post(handlers::update_profile))
        .route("/users/:user_id/permissions", post(handlers::update_permissions))
        .route("/users/:user_id/avatar", post(handlers::upload_avatar))

        // Static files (uploaded avatars live under static/avatars)
        .nest_service("/static", ServeDir::new("static"))

        // Add middleware
        .layer(from_fn(middleware::require_admin))
        .layer(session_layer)

        // File upload limits from config
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.upload.max_file_size))

        // Add state
        .with_state((user_store, config_state));

    println!("Server running");
    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", config.server.host, config.server.port)
    )
    .await
    .expect("Failed to bind server");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Failed to start server");
}
