// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Fetch Result Caching Layer
//!
//! Memoizes sample API responses so repeated renders in one session never
//! hit the network twice for the same request.
//!
//! ## Cache Key Generation
//!
//! ```text
//! key = SHA256(operation || credential fingerprint || params)
//! ```
//!
//! A different credential therefore never sees another token's results.
//! Only successful responses are stored; invalidation is always an explicit
//! call ([`FetchCache::invalidate`] / [`FetchCache::invalidate_all`]).
//!
//! Two concurrent misses on the same key may both fetch. Both store the same
//! payload, so the race costs one redundant request and nothing else.

use crate::credential::Credential;
use crate::error::FetchError;
use moka::future::Cache;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the fetch cache
#[derive(Debug, Clone)]
pub struct FetchCacheConfig {
    /// Maximum number of cached responses
    pub max_entries: u64,
    /// Optional time-to-live; `None` keeps entries until invalidated
    pub ttl: Option<Duration>,
    /// Whether to track hit/miss counters
    pub track_stats: bool,
}

impl Default for FetchCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 50_000,
            ttl: None,
            track_stats: true,
        }
    }
}

/// Memoized sample API operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchOperation {
    ListObjects,
    ObjectDetail,
}

impl FetchOperation {
    fn as_str(&self) -> &'static str {
        match self {
            FetchOperation::ListObjects => "list_objects",
            FetchOperation::ObjectDetail => "object_detail",
        }
    }
}

/// Cache key for one fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    hash: [u8; 32],
}

impl FetchKey {
    /// Create a key from the operation, the caller's credential and the
    /// request parameters (order-sensitive).
    pub fn new(operation: FetchOperation, credential: &Credential, params: &[&str]) -> Self {
        let mut hasher = Sha256::new();

        hasher.update(operation.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(credential.fingerprint().as_bytes());
        hasher.update(b"|");
        for param in params {
            hasher.update(param.as_bytes());
            hasher.update(b",");
        }

        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);

        Self { hash }
    }

    pub fn list_objects(credential: &Credential) -> Self {
        Self::new(FetchOperation::ListObjects, credential, &[])
    }

    pub fn object_detail(credential: &Credential, id: &str) -> Self {
        Self::new(FetchOperation::ObjectDetail, credential, &[id])
    }

    /// Get the hash as hex string (for debugging)
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct FetchCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Cache hit rate (0.0 - 1.0)
    pub hit_rate: f64,
    pub entry_count: u64,
}

/// Response cache shared by every fetch of one dashboard session
pub struct FetchCache {
    cache: Cache<FetchKey, Arc<Value>>,
    config: FetchCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FetchCache {
    pub fn new(config: FetchCacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_entries);
        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn default_cache() -> Self {
        Self::new(FetchCacheConfig::default())
    }

    pub async fn get(&self, key: &FetchKey) -> Option<Arc<Value>> {
        let found = self.cache.get(key).await;
        if self.config.track_stats {
            let counter = if found.is_some() { &self.hits } else { &self.misses };
            counter.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    pub async fn insert(&self, key: FetchKey, value: Arc<Value>) {
        self.cache.insert(key, value).await;
    }

    /// Return the cached payload for `key`, or run `fetch` and store its
    /// result. Errors are passed through and never cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: FetchKey, fetch: F) -> Result<Arc<Value>, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, FetchError>>,
    {
        if let Some(hit) = self.get(&key).await {
            tracing::trace!(key = %key.to_hex(), "fetch cache hit");
            return Ok(hit);
        }

        let value = Arc::new(fetch().await?);
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    pub async fn invalidate(&self, key: &FetchKey) {
        self.cache.invalidate(key).await;
    }

    /// Drop every cached response, e.g. after the credential changed.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub async fn stats(&self) -> FetchCacheStats {
        self.cache.run_pending_tasks().await;

        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        FetchCacheStats {
            hits,
            misses,
            hit_rate,
            entry_count: self.cache.entry_count(),
        }
    }
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::default_cache()
    }
}
