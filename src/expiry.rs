// Expiry policy shared by the key store and the token issuer

use chrono::{DateTime, Utc};

/// A key expiring exactly at `now` is still valid.
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > expires_at
}

pub fn is_valid(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    !is_expired(expires_at, now)
}
