use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use applications_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{auth, cors::permissive_cors, rate_limit},
    routes,
    services::{identity_service::MojangVerifier, notify_service::DiscordNotifier},
    store::{ApplicationStore, MemoryStore, PgStore},
    AppState,
};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let store: Arc<dyn ApplicationStore> = if config.database_url.is_some() {
        let pool = create_pool().await?;
        let store = PgStore::new(pool);
        store.ensure_schema().await?;
        info!("Using Postgres application store");
        Arc::new(store)
    } else {
        info!("DATABASE_URL not set, using in-memory application store");
        Arc::new(MemoryStore::new())
    };

    let verifier = MojangVerifier::new(
        config.mojang_api_base.clone(),
        Duration::from_secs(config.identity_timeout_secs),
    )?;
    let notifier = DiscordNotifier::new(
        config.discord_api_base.clone(),
        config.discord_bot_token.clone(),
        config.discord_application_channel_id.clone(),
    )?;

    let app_state = AppState::new(store, Arc::new(verifier), Arc::new(notifier));

    let limiter = rate_limit::RateLimiter::new(
        Duration::from_secs(config.rate_limit_window_secs),
        config.rate_limit_max_requests,
    );

    let public_api = Router::new()
        .route(
            "/api/applications/types",
            get(routes::application_routes::list_types),
        )
        .route(
            "/api/applications/form",
            get(routes::application_routes::get_form),
        );

    let applicant_api = Router::new()
        .route(
            "/api/applications",
            post(routes::application_routes::submit_application),
        )
        .route(
            "/api/applications/:id",
            get(routes::application_routes::get_application),
        )
        .layer(axum::middleware::from_fn(auth::require_bearer_auth));

    let review_api = Router::new()
        .route(
            "/api/applications/:id/review",
            post(routes::application_routes::review_application),
        )
        .layer(axum::middleware::from_fn(auth::require_moderator));

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .merge(public_api)
        .merge(applicant_api)
        .merge(review_api)
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit::rate_limit_middleware,
        ))
        .with_state(app_state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
