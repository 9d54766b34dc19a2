//! Short-lived verification codes for e-mail recovery flows.
//!
//! Codes live in an explicit [`TtlStore`] that callers own and pass by reference.
//! Time is always supplied by the caller.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

const DEFAULT_CODE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Key-value store whose entries expire after a fixed time-to-live.
#[derive(Debug)]
pub struct TtlStore<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or overwrite, returning the expiry instant.
    pub fn insert(&self, key: K, value: V, now: DateTime<Utc>) -> DateTime<Utc> {
        let expires_at = now + self.ttl;
        self.lock().insert(key, Entry { value, expires_at });
        expires_at
    }

    /// Live value for `key`. Expired entries are evicted on read.
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if now <= entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.lock().remove(key).map(|entry| entry.value)
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.expires_at);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, Entry<V>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Six-digit e-mail verification codes backed by a [`TtlStore`].
///
/// The caller owns the store and hands it to whatever issues or checks codes:
///
/// ```
/// use chrono::{Duration, Utc};
/// use soho_diagnosis::verification::VerificationCodes;
///
/// let codes = VerificationCodes::new(Duration::minutes(5));
/// let now = Utc::now();
/// let code = codes.issue("owner@example.com", now);
///
/// assert!(codes.verify("Owner@Example.com", &code, now + Duration::minutes(1)));
/// assert!(!codes.verify("owner@example.com", &code, now + Duration::minutes(6)));
/// ```
#[derive(Debug)]
pub struct VerificationCodes {
    store: TtlStore<String, String>,
}

impl VerificationCodes {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: TtlStore::new(ttl),
        }
    }

    /// Generate and store a fresh code, replacing any outstanding one.
    pub fn issue(&self, email: &str, now: DateTime<Utc>) -> String {
        let code = rand::thread_rng().gen_range(100_000..1_000_000).to_string();
        self.store.insert(normalize(email), code.clone(), now);
        code
    }

    /// Store a caller-chosen code.
    pub fn store(&self, email: &str, code: &str, now: DateTime<Utc>) -> DateTime<Utc> {
        self.store.insert(normalize(email), code.to_string(), now)
    }

    pub fn verify(&self, email: &str, code: &str, now: DateTime<Utc>) -> bool {
        self.store
            .get(&normalize(email), now)
            .map(|stored| stored == code.trim())
            .unwrap_or(false)
    }

    pub fn revoke(&self, email: &str) {
        self.store.remove(&normalize(email));
    }

    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        self.store.purge_expired(now)
    }
}

impl Default for VerificationCodes {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_CODE_TTL_MINUTES))
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
