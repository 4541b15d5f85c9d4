// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read cache for recommendation listings.
//!
//! Entries are keyed by (user, generation, limit) and expire after a TTL.
//! Evicting a user bumps that user's generation, so every listing cached
//! under an older generation becomes unreachable at once, whatever its limit.
//! A reader captures the generation before going to storage; if a writer
//! evicts in between, the reader's result lands under a dead key.
//!
//! Generations are drawn from one monotonic epoch and held in a bounded
//! map that forgets idle users. A user seen again after being forgotten
//! gets a fresh epoch, which is newer than any key handed out before.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::sync::Cache;
use tidewell_config::model::CacheConfig;
use tidewell_core::Recommendation;
use tracing::debug;

/// Key for one cached listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    user_id: String,
    generation: u64,
    /// Normalized limit; `0` means unbounded.
    limit: i64,
}

impl CacheKey {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

/// `None` and non-positive limits all mean "unbounded".
pub fn normalize_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(n) if n > 0 => n,
        _ => 0,
    }
}

/// TTL-bounded listing cache with per-user invalidation.
pub struct RecommendationCache {
    entries: Cache<CacheKey, Arc<Vec<Recommendation>>>,
    generations: Cache<String, u64>,
    epoch: AtomicU64,
}

impl RecommendationCache {
    pub fn new(config: &CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl())
            .build();
        let generations = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_idle(config.ttl())
            .build();
        Self {
            entries,
            generations,
            epoch: AtomicU64::new(0),
        }
    }

    fn next_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Key for `(user_id, limit)` at the user's current generation.
    pub fn key(&self, user_id: &str, limit: Option<i64>) -> CacheKey {
        let generation = self
            .generations
            .get_with(user_id.to_string(), || self.next_epoch());
        CacheKey {
            user_id: user_id.to_string(),
            generation,
            limit: normalize_limit(limit),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<Recommendation>>> {
        self.entries.get(key)
    }

    pub fn put(&self, key: CacheKey, listing: Vec<Recommendation>) -> Arc<Vec<Recommendation>> {
        let listing = Arc::new(listing);
        self.entries.insert(key, Arc::clone(&listing));
        listing
    }

    /// Drop every cached listing for `user_id`.
    pub fn evict(&self, user_id: &str) {
        let generation = self.next_epoch();
        self.generations.insert(user_id.to_string(), generation);
        debug!(user_id, generation, "evicted cached recommendations");
    }
}
