use crate::api::models::EnrichedArticle;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Default time before a cached article list is considered stale.
pub fn default_ttl() -> Duration {
    Duration::minutes(15)
}

/// Normalized key for a cacheable news request. Two requests with the same
/// query, country and category hit the same slot regardless of arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub query: String,
    pub country: String,
    pub category: Option<String>,
}

impl Fingerprint {
    pub fn new(query: &str, country: &str, category: Option<&str>) -> Self {
        Self {
            query: query.to_string(),
            country: country.to_string(),
            category: category.map(str::to_string),
        }
    }
}

struct CacheEntry {
    created_at: DateTime<Utc>,
    payload: Vec<EnrichedArticle>,
}

/// In-memory, time-bounded cache of assembled article lists. Entries expire
/// lazily on read; a repeated store replaces the entry wholesale.
pub struct NewsCache {
    ttl: Duration,
    entries: Mutex<HashMap<Fingerprint, CacheEntry>>,
}

impl NewsCache {
    pub fn new() -> Self {
        Self::with_ttl(default_ttl())
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached payload if a fresh entry exists for the fingerprint.
    /// An expired entry is removed and treated as absent.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<Vec<EnrichedArticle>> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(fingerprint) {
            Some(entry) if Utc::now() - entry.created_at < self.ttl => {
                Some(entry.payload.clone())
            }
            Some(_) => {
                entries.remove(fingerprint);
                None
            }
            None => None,
        }
    }

    /// Inserts or overwrites the entry for the fingerprint with a fresh
    /// timestamp. Only complete payloads are ever stored.
    pub fn store(&self, fingerprint: Fingerprint, payload: Vec<EnrichedArticle>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            fingerprint,
            CacheEntry {
                created_at: Utc::now(),
                payload,
            },
        );
    }
}

impl Default for NewsCache {
    fn default() -> Self {
        Self::new()
    }
}
