// Identity-provider simulator
//
// Serves rotating RSA public keys as a JWKS document and issues RS256 tokens
// signed by them, including deliberately stale tokens for testing how
// clients handle expiry.

use jwks_simulator::{config::Config, server};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jwks_simulator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JWKS simulator");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::start_server(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
