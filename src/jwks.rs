// Projection of valid key pairs into a JWKS document

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rsa::traits::PublicKeyParts;

use crate::types::{JsonWebKey, JwksResponse, KeyPair};

impl From<&KeyPair> for JsonWebKey {
    fn from(key: &KeyPair) -> Self {
        let n_bytes = key.public_key().n().to_bytes_be();
        let e_bytes = key.public_key().e().to_bytes_be();

        JsonWebKey {
            kid: key.kid().to_string(),
            kty: "RSA".to_string(),
            alg: "RS256".to_string(),
            key_use: "sig".to_string(),
            n: URL_SAFE_NO_PAD.encode(n_bytes),
            e: URL_SAFE_NO_PAD.encode(e_bytes),
        }
    }
}

/// Build the JWKS document for `keys`, preserving their order.
///
/// Filtering is the caller's job; pass the output of `KeyStore::valid_keys`.
pub fn project<'a, I>(keys: I) -> JwksResponse
where
    I: IntoIterator<Item = &'a KeyPair>,
{
    JwksResponse {
        keys: keys.into_iter().map(JsonWebKey::from).collect(),
    }
}
