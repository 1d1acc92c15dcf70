//! Memoization of match-function calls.
//!
//! Model-backed matching is slow and costs money, and identical lookups
//! recur across reconciliation batches. Results are memoized by the full
//! argument identity with a staleness window: a cached entry is reused
//! until it is older than the window, then recomputed and refreshed.
//! "No match" outcomes are cached the same as hits.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::domain::ListMatch;

/// Full argument identity of one match-function call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub input_name: String,
    pub candidates: Vec<String>,
    pub model: String,
    pub context: Option<String>,
}

/// Injectable cache for match-function results.
///
/// `get` must return `None` for both a miss and a stale entry; the
/// matcher then recomputes and calls `put` with the fresh value.
pub trait MatchCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Option<ListMatch>>;
    fn put(&self, key: CacheKey, value: Option<ListMatch>);
}

/// In-memory cache with a fixed staleness window.
///
/// Process-local; entries live as long as the cache does and expire by
/// age, not by eviction pressure.
pub struct StaleCache {
    window: Duration,
    entries: Mutex<HashMap<CacheKey, (Option<ListMatch>, DateTime<Utc>)>>,
}

impl StaleCache {
    /// Cache with the given staleness window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cache with the standard one-day window
    pub fn one_day() -> Self {
        Self::new(Duration::days(1))
    }
}

impl MatchCache for StaleCache {
    fn get(&self, key: &CacheKey) -> Option<Option<ListMatch>> {
        let entries = self.entries.lock().unwrap();
        let (value, stored_at) = entries.get(key)?;
        if Utc::now() - *stored_at >= self.window {
            return None;
        }
        Some(value.clone())
    }

    fn put(&self, key: CacheKey, value: Option<ListMatch>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key, (value, Utc::now()));
    }
}

/// Cache that stores nothing; every call falls through.
pub struct NoopCache;

impl MatchCache for NoopCache {
    fn get(&self, _key: &CacheKey) -> Option<Option<ListMatch>> {
        None
    }

    fn put(&self, _key: CacheKey, _value: Option<ListMatch>) {}
}
