mod config;
mod routes;
mod services;
mod state;

use tracing::info;

use crate::config::RelayConfig;

#[derive(Debug, thiserror::Error)]
enum RelayError {
    #[error("failed to bind port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    tracing_subscriber::fmt::init();

    let config = RelayConfig::from_env();
    let state = state::RelayState::new(config.channel_capacity);
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .map_err(|source| RelayError::Bind { port: config.port, source })?;

    info!(port = config.port, "trajectory relay listening");
    axum::serve(listener, app).await.map_err(RelayError::Serve)
}
