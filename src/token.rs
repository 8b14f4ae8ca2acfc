// Token issuance against the key store

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use tracing::instrument;

use crate::error::JwksError;
use crate::store::KeyStore;
use crate::types::{Claims, KeyPair};

/// Default `exp - iat` for tokens issued in normal mode.
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: i64 = 60;

const DEMO_SUBJECT: &str = "user_id";
const DEMO_NAME: &str = "John Doe";

#[derive(Debug, Clone, Copy)]
pub struct TokenIssuer {
    lifetime: Duration,
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECONDS))
    }
}

impl TokenIssuer {
    pub fn new(lifetime: Duration) -> Self {
        Self { lifetime }
    }

    /// Sign a token with the first key valid at `now`.
    ///
    /// With `force_expired` the `exp` claim is the signing key's own expiry
    /// rather than `iat + lifetime`.
    pub fn issue(
        &self,
        store: &KeyStore,
        now: DateTime<Utc>,
        force_expired: bool,
    ) -> Result<String, JwksError> {
        let key = store.first_valid(now).ok_or(JwksError::NoValidKey)?;
        self.issue_with(key, now, force_expired)
    }

    /// Sign with an already selected key. Lets callers release the store
    /// before the RSA work.
    #[instrument(skip_all, fields(force_expired = force_expired, kid = key.kid()))]
    pub fn issue_with(
        &self,
        key: &KeyPair,
        now: DateTime<Utc>,
        force_expired: bool,
    ) -> Result<String, JwksError> {
        let claims = self.claims_for(key, now, force_expired);
        sign(key, &claims)
    }

    fn claims_for(&self, key: &KeyPair, now: DateTime<Utc>, force_expired: bool) -> Claims {
        let iat = now.timestamp();
        let exp = if force_expired {
            key.expires_at().timestamp()
        } else {
            iat + self.lifetime.num_seconds()
        };

        Claims {
            sub: DEMO_SUBJECT.to_string(),
            name: DEMO_NAME.to_string(),
            iat,
            exp,
        }
    }
}

fn sign(key: &KeyPair, claims: &Claims) -> Result<String, JwksError> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(key.kid().to_string());

    let der = key
        .private_key_der()
        .map_err(|e| JwksError::Signing(e.to_string()))?;
    let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());

    encode(&header, claims, &encoding_key).map_err(|e| JwksError::Signing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwks::project;
    use crate::key_management::testutil::key_expiring_in;
    use chrono::TimeZone;
    use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().unwrap()
    }

    /// Decode against the JWKS entry named by the header, without checking exp.
    fn decode_via_jwks(token: &str, store: &KeyStore, now: DateTime<Utc>) -> Claims {
        let kid = decode_header(token).unwrap().kid.unwrap();
        let jwks = project(store.valid_keys(now));
        let jwk = jwks.keys.iter().find(|k| k.kid == kid).unwrap();

        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).unwrap();
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        decode::<Claims>(token, &decoding_key, &validation)
            .unwrap()
            .claims
    }

    #[test]
    fn test_empty_store_has_no_valid_key() {
        let store = KeyStore::new();
        let result = TokenIssuer::default().issue(&store, t0(), false);
        assert!(matches!(result, Err(JwksError::NoValidKey)));
    }

    #[test]
    fn test_all_expired_has_no_valid_key() {
        let mut store = KeyStore::new();
        store.insert(key_expiring_in(t0() - Duration::seconds(120), Duration::seconds(60)));
        let result = TokenIssuer::default().issue(&store, t0(), true);
        assert!(matches!(result, Err(JwksError::NoValidKey)));
    }

    #[test]
    fn test_normal_token_lifetime() {
        let mut store = KeyStore::new();
        store.insert(key_expiring_in(t0(), Duration::seconds(600)));

        let token = TokenIssuer::default().issue(&store, t0(), false).unwrap();
        let claims = decode_via_jwks(&token, &store, t0());

        assert_eq!(claims.iat, t0().timestamp());
        assert_eq!(claims.exp - claims.iat, 60);
        assert_eq!(claims.sub, "user_id");
        assert_eq!(claims.name, "John Doe");
    }

    #[test]
    fn test_forced_expired_uses_key_expiry() {
        let mut store = KeyStore::new();
        let key = key_expiring_in(t0(), Duration::seconds(45));
        let expires_at = key.expires_at();
        store.insert(key);

        let now = t0() + Duration::seconds(10);
        let token = TokenIssuer::default().issue(&store, now, true).unwrap();
        let claims = decode_via_jwks(&token, &store, now);

        assert_eq!(claims.exp, expires_at.timestamp());
        assert_eq!(claims.iat, now.timestamp());
    }

    #[test]
    fn test_header_kid_is_first_valid_key() {
        let mut store = KeyStore::new();
        let stale = key_expiring_in(t0() - Duration::seconds(120), Duration::seconds(60));
        let first = key_expiring_in(t0(), Duration::seconds(60));
        let second = key_expiring_in(t0(), Duration::seconds(600));
        let first_kid = first.kid().to_string();
        store.insert(stale);
        store.insert(first);
        store.insert(second);

        let token = TokenIssuer::default().issue(&store, t0(), false).unwrap();
        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some(first_kid.as_str()));
    }

    #[test]
    fn test_issue_with_selected_key_matches_store_issue() {
        let mut store = KeyStore::new();
        store.insert(key_expiring_in(t0(), Duration::seconds(60)));
        let selected = store.first_valid(t0()).cloned().unwrap();

        let issuer = TokenIssuer::default();
        let from_store = decode_via_jwks(&issuer.issue(&store, t0(), true).unwrap(), &store, t0());
        let token = issuer.issue_with(&selected, t0(), true).unwrap();
        let from_key = decode_via_jwks(&token, &store, t0());

        assert_eq!(decode_header(&token).unwrap().kid.as_deref(), Some(selected.kid()));
        assert_eq!(from_key.exp, from_store.exp);
        assert_eq!(from_key.exp, selected.expires_at().timestamp());
        assert_eq!(from_key.iat, from_store.iat);
    }

    #[test]
    fn test_signature_verifies_with_pair_public_key() {
        use rsa::traits::PublicKeyParts;

        let key = key_expiring_in(t0(), Duration::seconds(60));
        let token = TokenIssuer::default().issue_with(&key, t0(), false).unwrap();

        let n = key.public_key().n().to_bytes_be();
        let e = key.public_key().e().to_bytes_be();
        let decoding_key = DecodingKey::from_rsa_raw_components(&n, &e);
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        assert!(decode::<Claims>(&token, &decoding_key, &validation).is_ok());
    }

    #[test]
    fn test_custom_lifetime() {
        let mut store = KeyStore::new();
        store.insert(key_expiring_in(t0(), Duration::seconds(60)));

        let issuer = TokenIssuer::new(Duration::seconds(300));
        let token = issuer.issue(&store, t0(), false).unwrap();
        let claims = decode_via_jwks(&token, &store, t0());
        assert_eq!(claims.exp - claims.iat, 300);
    }
}
