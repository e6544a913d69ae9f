// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Response cache.
//!
//! Rendered API responses are stored as JSON strings with a per-entry TTL.
//! The HTTP layer reads through the cache before doing any upstream work and
//! writes back after a successful response.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key-value store with per-entry expiry.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` for `ttl`. Overwrites any existing entry.
    fn set_ex(&self, key: &str, ttl: Duration, value: String);
}

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// In-process LRU cache.
pub struct LruCacheStore {
    cache: Mutex<LruCache<String, CacheEntry>>,
}

impl LruCacheStore {
    /// Create a cache holding at most `capacity` entries (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for LruCacheStore {
    fn get(&self, key: &str) -> Option<String> {
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(key) {
            if Instant::now() < entry.expires_at {
                return Some(entry.value.clone());
            }
            // Expired
            cache.pop(key);
        }
        None
    }

    fn set_ex(&self, key: &str, ttl: Duration, value: String) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(
                key.to_string(),
                CacheEntry {
                    value,
                    expires_at: Instant::now() + ttl,
                },
            );
        }
    }
}

/// Read and decode a cached JSON value. Undecodable entries count as misses.
pub fn read_json<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Ignoring undecodable cache entry");
            None
        }
    }
}

pub fn write_json<T: Serialize>(store: &dyn CacheStore, key: &str, ttl: Duration, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set_ex(key, ttl, raw),
        Err(e) => tracing::warn!(key = %key, error = %e, "Failed to encode cache entry"),
    }
}

/// Cache keys.
pub mod keys {
    pub const TOKENS: &str = "tokens";

    pub fn apr(chain: &str) -> String {
        format!("apr-{chain}")
    }

    pub fn price(id: &str) -> String {
        format!("price-{id}")
    }

    pub fn lp(address: &str) -> String {
        format!("lp-{address}")
    }

    /// Balance responses are keyed by the raw `chains` query value.
    pub fn balance(address: &str, chains: &str) -> String {
        format!("{address}?chains={chains}")
    }

    /// Resolved chain profiles are keyed by bare chain name.
    pub fn chain(name: &str) -> String {
        name.to_string()
    }
}
