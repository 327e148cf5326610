mod handlers;

use axum::{
    routing::{get, post},
    Router,
    middleware::{self},
};
use clap::Parser;
use common::{AppState, Config, auth::auth_middleware};
use database::Database;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use rust_embed::RustEmbed;
use axum_embed::ServeEmbed;
use tower_sessions::{MemoryStore, SessionManagerLayer};

#[derive(RustEmbed, Clone)]
#[folder = "public/"]
struct Assets;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment overrides from .env, if present
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    // 2. Initialize Logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 3. Load Config from CLI args and environment
    let config = Config::parse();

    // 4. Initialize Database
    let db = Database::new(&config.database_url).await?;
    db.run_migrations().await?;

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    // 5. Session Store
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false);

    // 6. Routing
    let serve_assets = ServeEmbed::<Assets>::new();

    for file in Assets::iter() {
        tracing::debug!("Embedded file: {}", file);
    }

    let protected_routes = Router::<Arc<AppState>>::new()
        .route("/", get(handlers::dashboard::dashboard))
        .route("/api/summary", get(handlers::dashboard::summary_api))
        .nest("/transactions", transactions::handler::transactions_router(state.clone()))
        .nest("/categories", categories::handler::categories_router(state.clone()))
        .nest("/settings", profile::handler::profile_router(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let app = Router::<Arc<AppState>>::new()
        .route("/login", get(handlers::auth::login_get).post(handlers::auth::login_post))
        .route("/logout", post(handlers::auth::logout))
        .nest_service("/public", serve_assets)
        .merge(protected_routes)
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    // 7. Start Server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    if config.app_password.is_none() {
        tracing::warn!("APP_PASSWORD is not set! Authentication is DISABLED. The site will have NO login required.");
    }
    axum::serve(listener, app).await?;

    Ok(())
}
