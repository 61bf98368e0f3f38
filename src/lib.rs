pub mod appresult;
pub mod auth;
pub mod config;
pub mod games;
pub mod lobby;
pub mod models;
pub mod profiles;
pub mod rating;
pub mod store;
pub mod ws;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::{header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE}, HeaderValue, Method},
    Router,
};
use tower_http::cors::CorsLayer;

pub use appresult::{AppError, AppResult};
pub use config::Config;
pub use lobby::Lobby;
pub use store::Store;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: Store,
    pub lobby: Lobby,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        Self {
            lobby: Lobby::new(config.channel_capacity),
            store,
            config: Arc::new(config),
        }
    }
}

/// The whole HTTP + WebSocket surface, with CORS opened to the configured
/// front-end origin.
pub fn app(state: AppState) -> anyhow::Result<Router> {
    let origin: HeaderValue = state
        .config
        .cors_origin
        .parse()
        .map_err(|err| anyhow::anyhow!("CORS_ORIGIN={}: {err}", state.config.cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, CACHE_CONTROL])
        .allow_credentials(true);

    Ok(Router::new()
        .merge(ws::router())
        .merge(games::router())
        .merge(profiles::router())
        .with_state(state)
        .layer(cors))
}
