//! Short-lived response cache.
//!
//! Answers repeated requests for the same path and query from memory for a
//! few seconds. It is created per refresh cycle and dropped with it, so no
//! response outlives the cycle that fetched it.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use tracing::trace;

use crate::error::ClientResult;
use crate::source::{ApiRequest, BoxFuture, JsonSource};

/// Cached response body with fetch time.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    fetched_at: Instant,
}

/// Successful responses keyed by path and query.
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fresh entry for `key`. Expired entries are evicted on lookup.
    pub fn get(&self, key: &str) -> Option<Value> {
        let fresh = {
            let entry = self.entries.get(key)?;
            if entry.fetched_at.elapsed() < self.ttl {
                Some(entry.value.clone())
            } else {
                None
            }
        };

        if fresh.is_none() {
            self.entries.remove(key);
        }
        fresh
    }

    pub fn insert(&self, key: String, value: Value) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `JsonSource` wrapper that serves repeats from a `ResponseCache`.
///
/// Failures are not cached.
pub struct CachedSource<'s, S: JsonSource + ?Sized> {
    inner: &'s S,
    cache: ResponseCache,
}

impl<'s, S: JsonSource + ?Sized> CachedSource<'s, S> {
    pub fn new(inner: &'s S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: ResponseCache::new(ttl),
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}

impl<S: JsonSource + ?Sized> JsonSource for CachedSource<'_, S> {
    fn get_json<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, ClientResult<Value>> {
        Box::pin(async move {
            let key = request.cache_key();
            if let Some(value) = self.cache.get(&key) {
                trace!(key = %key, "Response cache hit");
                return Ok(value);
            }

            let value = self.inner.get_json(request).await?;
            self.cache.insert(key, value.clone());
            Ok(value)
        })
    }
}
