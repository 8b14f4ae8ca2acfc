// Server setup and configuration

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::endpoints::{AppState, auth_handler, jwks_handler, key_pair_handler};

/// Create the application router with all endpoints
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/.well-known/jwks.json", get(jwks_handler))
        .route("/jwks", get(jwks_handler)) // Alternative endpoint
        .route("/auth", post(auth_handler))
        .route("/keyPair", get(key_pair_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let app_state = AppState::new(&config);

    for _ in 0..config.seed_keys {
        let key = app_state.create_key_pair().await?;
        info!(kid = %key.kid, expires_at = %key.expiry_timestamp, "seeded key pair");
    }

    let app = create_app(app_state);

    let listener = TcpListener::bind(config.bind_address.as_str()).await?;
    info!("JWKS simulator listening on http://{}", listener.local_addr()?);
    info!("  GET  /.well-known/jwks.json - JWKS endpoint");
    info!("  GET  /jwks                   - Alternative JWKS endpoint");
    info!("  POST /auth                   - Issue a token");
    info!("  POST /auth?expired=true      - Issue a token with exp = signing key expiry");
    info!("  GET  /keyPair                - Create a key pair");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("JWKS simulator stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_app() {
        let app_state = AppState::new(&Config::default());

        // This should not panic
        let _app = create_app(app_state);
    }
}
