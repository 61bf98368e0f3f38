use goban_lobby::{app, AppState, Config, Store};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let store = Store::connect(&config.database_url).await?;
    store.migrate().await?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(store, config);
    if let Some(max_wait) = state.config.wait_timeout {
        state.lobby.spawn_sweeper(state.config.sweep_interval, max_wait);
    }

    let app = app(state)?;
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "lobby listening");
    axum::serve(listener, app).await?;
    Ok(())
}
