// Key generation for the JWKS simulator

use chrono::{DateTime, Duration, SubsecRound, Utc};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::EncodePublicKey;
use tracing::instrument;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::JwksError;
use crate::expiry;
use crate::types::{KeyPair, KeyPairResponse};

pub const RSA_KEY_BITS: usize = 2048;

/// Default lifetime of a freshly generated key pair.
pub const DEFAULT_KEY_VALIDITY_SECONDS: i64 = 60;

impl KeyPair {
    /// Generate a new RSA key pair expiring `validity` after it is ready.
    ///
    /// The clock is read once the prime search has finished, so slow
    /// generation does not eat into the validity window. CPU-bound; async
    /// callers should run it on a blocking thread.
    #[instrument(skip_all, fields(bits = RSA_KEY_BITS))]
    pub fn generate(clock: &dyn Clock, validity: Duration) -> Result<Self, JwksError> {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, RSA_KEY_BITS)
            .map_err(|e| JwksError::KeyGeneration(e.to_string()))?;

        let key = Self::from_private_key(private_key, clock.now(), validity);
        tracing::debug!(kid = %key.kid(), expires_at = %key.expires_at(), "generated key pair");
        Ok(key)
    }

    /// Wrap existing key material with a fresh kid.
    ///
    /// `now` is truncated to whole seconds so that `expires_at` round-trips
    /// exactly through the `exp` claim.
    pub fn from_private_key(private_key: RsaPrivateKey, now: DateTime<Utc>, validity: Duration) -> Self {
        KeyPair::new(
            Uuid::new_v4().to_string(),
            private_key,
            now.trunc_subsecs(0) + validity,
        )
    }

    /// Check if the key pair has expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        expiry::is_expired(self.expires_at(), now)
    }

    /// Check if the key pair is still valid (not expired) at `now`
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        expiry::is_valid(self.expires_at(), now)
    }

    /// PKCS#1 DER of the private key, as consumed by the token signer.
    pub(crate) fn private_key_der(&self) -> rsa::pkcs1::Result<rsa::pkcs1::der::SecretDocument> {
        self.private_key().to_pkcs1_der()
    }

    /// PKCS#1 PEM of the private key.
    pub fn private_key_pem(&self) -> Result<String, JwksError> {
        let pem = self
            .private_key()
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| JwksError::KeyGeneration(e.to_string()))?;
        Ok(pem.to_string())
    }

    /// SPKI PEM of the public key.
    pub fn public_key_pem(&self) -> Result<String, JwksError> {
        self.public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| JwksError::KeyGeneration(e.to_string()))
    }
}

impl TryFrom<&KeyPair> for KeyPairResponse {
    type Error = JwksError;

    fn try_from(key: &KeyPair) -> Result<Self, Self::Error> {
        Ok(KeyPairResponse {
            kid: key.kid().to_string(),
            private_key: key.private_key_pem()?,
            public_key: key.public_key_pem()?,
            expiry_timestamp: key.expires_at(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use std::sync::OnceLock;

    /// One 2048-bit key per test binary; kids and expiries still differ per pair.
    pub(crate) fn shared_private_key() -> RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS).unwrap())
            .clone()
    }

    pub(crate) fn key_expiring_in(now: DateTime<Utc>, validity: Duration) -> KeyPair {
        KeyPair::from_private_key(shared_private_key(), now, validity)
    }
}
