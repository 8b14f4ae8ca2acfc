// In-memory key store

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::types::KeyPair;

/// Store handle shared between request handlers.
pub type SharedKeyStore = Arc<RwLock<KeyStore>>;

/// Ordered registry of every key pair created during the process lifetime.
///
/// Insertion order is significant: signing always uses the earliest-inserted
/// key that is still valid.
#[derive(Debug, Default)]
pub struct KeyStore {
    keys: Vec<KeyPair>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedKeyStore {
        Arc::new(RwLock::new(self))
    }

    pub fn insert(&mut self, key: KeyPair) {
        self.keys.push(key);
    }

    /// All keys valid at `now`, in insertion order.
    pub fn valid_keys(&self, now: DateTime<Utc>) -> Vec<&KeyPair> {
        self.keys.iter().filter(|key| key.is_valid(now)).collect()
    }

    pub fn first_valid(&self, now: DateTime<Utc>) -> Option<&KeyPair> {
        self.keys.iter().find(|key| key.is_valid(now))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Drop keys that expired more than `grace` before `now`.
    ///
    /// Returns the number of evicted keys. Valid keys are never touched.
    pub fn prune_expired(&mut self, now: DateTime<Utc>, grace: Duration) -> usize {
        let before = self.keys.len();
        let cutoff = now - grace;
        self.keys.retain(|key| key.is_valid(cutoff));
        before - self.keys.len()
    }
}
