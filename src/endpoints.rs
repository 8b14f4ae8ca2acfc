// HTTP handlers for the JWKS, auth and key pair endpoints

use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Duration;
use std::sync::Arc;
use tracing::instrument;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::JwksError;
use crate::jwks;
use crate::store::{KeyStore, SharedKeyStore};
use crate::token::TokenIssuer;
use crate::types::{AuthQuery, AuthResponse, JwksResponse, KeyPair, KeyPairResponse};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedKeyStore,
    pub clock: Arc<dyn Clock>,
    pub issuer: TokenIssuer,
    pub key_validity: Duration,
    pub key_retention_grace: Option<Duration>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        AppState {
            store: KeyStore::new().shared(),
            clock,
            issuer: TokenIssuer::new(config.token_lifetime),
            key_validity: config.key_validity,
            key_retention_grace: config.key_retention_grace,
        }
    }

    /// Generate a key pair off the async runtime and append it to the store.
    pub async fn create_key_pair(&self) -> Result<KeyPairResponse, JwksError> {
        let clock = Arc::clone(&self.clock);
        let validity = self.key_validity;
        let key = tokio::task::spawn_blocking(move || KeyPair::generate(clock.as_ref(), validity))
            .await
            .map_err(|e| JwksError::Internal(format!("key generation task failed: {}", e)))??;

        let response = KeyPairResponse::try_from(&key)?;

        let mut store = self.store.write();
        store.insert(key);
        if let Some(grace) = self.key_retention_grace {
            let evicted = store.prune_expired(self.clock.now(), grace);
            if evicted > 0 {
                tracing::debug!(evicted, "evicted expired key pairs");
            }
        }
        tracing::info!(kid = %response.kid, stored = store.len(), "key pair created");

        Ok(response)
    }
}

/// JWKS endpoint handler - serves public keys in JWKS format
/// Only returns keys that have not expired
#[instrument(name = "jwks.get", skip_all, fields(keys))]
pub async fn jwks_handler(State(state): State<AppState>) -> Json<JwksResponse> {
    let now = state.clock.now();
    let response = {
        let store = state.store.read();
        jwks::project(store.valid_keys(now))
    };

    tracing::Span::current().record("keys", response.keys.len());
    Json(response)
}

/// Auth endpoint handler - issues JWTs signed by the first valid key
/// `?expired=true` sets `exp` to the signing key's own expiry
#[instrument(name = "auth.post", skip_all)]
pub async fn auth_handler(
    State(state): State<AppState>,
    Query(params): Query<AuthQuery>,
) -> Result<Json<AuthResponse>, JwksError> {
    let now = state.clock.now();
    let key = state.store.read().first_valid(now).cloned();

    let token = match key {
        Some(key) => state.issuer.issue_with(&key, now, params.force_expired()),
        None => Err(JwksError::NoValidKey),
    };

    match token {
        Ok(token) => Ok(Json(AuthResponse { token })),
        Err(e) => {
            tracing::warn!(error = %e, "token issuance failed");
            Err(e)
        }
    }
}

/// Key pair endpoint handler - creates a key pair and returns it, private key included
#[instrument(name = "key_pair.get", skip_all)]
pub async fn key_pair_handler(
    State(state): State<AppState>,
) -> Result<Json<KeyPairResponse>, JwksError> {
    state.create_key_pair().await.map(Json)
}
