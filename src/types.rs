// Data structures for the JWKS simulator

use chrono::{DateTime, Utc};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// RSA key pair with its expiry.
///
/// Fields are private so that `expires_at` cannot change after creation;
/// see `key_management` for the public constructors.
#[derive(Clone)]
pub struct KeyPair {
    kid: String,
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
    expires_at: DateTime<Utc>,
}

impl KeyPair {
    pub(crate) fn new(kid: String, private_key: RsaPrivateKey, expires_at: DateTime<Utc>) -> Self {
        let public_key = RsaPublicKey::from(&private_key);
        KeyPair {
            kid,
            private_key,
            public_key,
            expires_at,
        }
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("kid", &self.kid)
            .field("private_key", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// JSON Web Key structure for JWKS response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kid: String, // Key ID
    pub kty: String, // Key type (RSA)
    pub alg: String, // Algorithm (RS256)
    #[serde(rename = "use")]
    pub key_use: String, // Key usage (sig for signature)
    pub n: String,   // Modulus (base64url)
    pub e: String,   // Exponent (base64url)
}

/// JWKS response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<JsonWebKey>,
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject
    pub name: String, // Display name
    pub iat: i64,     // Issued at
    pub exp: i64,     // Expires at
}

/// Auth endpoint response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Query parameters for auth endpoint
#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub expired: Option<String>,
}

impl AuthQuery {
    /// Only the literal `true` selects the forced-expired mode.
    pub fn force_expired(&self) -> bool {
        self.expired.as_deref() == Some("true")
    }
}

/// Key pair endpoint response, private half included.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairResponse {
    pub kid: String,
    pub private_key: String,
    pub public_key: String,
    pub expiry_timestamp: DateTime<Utc>,
}
