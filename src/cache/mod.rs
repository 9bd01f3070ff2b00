//! Single-slot TTL cache for the last known good location
//!
//! One serialized entry in the key-value store, read on every acquisition
//! attempt. Strict reads demand a fresh, accurate entry; lenient reads
//! accept anything present and are logged as degraded.

pub mod store;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::constants::CACHE_SLOT_KEY;
use crate::core::ResolvedLocation;
use crate::utils::clock::Clock;

pub use store::{KeyValueStore, MemoryStore};

/// Tunables for the cache slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Age beyond which a strict read refuses the entry (milliseconds)
    pub ttl_ms: u64,
    /// Accuracy beyond which a strict read refuses the entry (meters)
    pub max_accuracy_m: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 60_000,        // one minute of trust in a stationary user
            max_accuracy_m: 300.0, // coarser fixes are not worth replaying
        }
    }
}

/// The cache slot payload as persisted in the key-value store
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    location: ResolvedLocation,
    stored_at_ms: u64,
}

/// Single-slot location cache over an injected key-value store.
///
/// Single writer, last write wins; callers sharing one store across
/// several components must serialize access themselves.
pub struct LocationCache {
    store: Box<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    hit_count: u32,
    miss_count: u32,
}

impl LocationCache {
    /// Create a cache with default tunables
    pub fn new(store: Box<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(store, clock, CacheConfig::default())
    }

    /// Create a cache with custom tunables
    pub fn with_config(
        store: Box<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            hit_count: 0,
            miss_count: 0,
        }
    }

    /// Read the slot.
    ///
    /// Strict mode (`lenient == false`) returns nothing when the entry is
    /// older than the TTL or coarser than the accuracy ceiling. Lenient
    /// mode returns whatever is present and logs the degraded read.
    /// The returned location is marked `from_cache`.
    pub fn get(&mut self, lenient: bool) -> Option<ResolvedLocation> {
        let raw = match self.store.get_item(CACHE_SLOT_KEY) {
            Some(raw) => raw,
            None => {
                self.miss_count += 1;
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(error) => {
                // A corrupt slot is a miss, not an error; drop it so the
                // next write starts clean
                warn!(%error, "cache slot was corrupt, clearing");
                self.store.remove_item(CACHE_SLOT_KEY);
                self.miss_count += 1;
                return None;
            }
        };

        let age_ms = self.clock.now_ms().saturating_sub(entry.stored_at_ms);

        if !lenient {
            if age_ms > self.config.ttl_ms {
                debug!(age_ms, ttl_ms = self.config.ttl_ms, "strict cache read: entry expired");
                self.miss_count += 1;
                return None;
            }
            if entry.location.accuracy_m > self.config.max_accuracy_m {
                debug!(
                    accuracy_m = entry.location.accuracy_m,
                    "strict cache read: entry too coarse"
                );
                self.miss_count += 1;
                return None;
            }
        } else if age_ms > self.config.ttl_ms || entry.location.accuracy_m > self.config.max_accuracy_m
        {
            warn!(
                age_ms,
                accuracy_m = entry.location.accuracy_m,
                "serving degraded cache entry on lenient read"
            );
        }

        self.hit_count += 1;
        let mut location = entry.location;
        location.from_cache = true;
        Some(location)
    }

    /// Overwrite the slot with the given location.
    ///
    /// Default-reference and simulated locations are refused; returns
    /// whether the write happened.
    pub fn set(&mut self, location: &ResolvedLocation) -> bool {
        if !location.cacheable() {
            debug!("refusing to cache a default or simulated location");
            return false;
        }

        let entry = CacheEntry {
            location: location.clone(),
            stored_at_ms: self.clock.now_ms(),
        };
        match serde_json::to_string(&entry) {
            Ok(raw) => {
                self.store.set_item(CACHE_SLOT_KEY, &raw);
                true
            }
            Err(error) => {
                warn!(%error, "failed to serialize cache entry");
                false
            }
        }
    }

    /// Remove the slot
    pub fn clear(&mut self) {
        self.store.remove_item(CACHE_SLOT_KEY);
    }

    /// (hits, misses) since construction
    pub fn statistics(&self) -> (u32, u32) {
        (self.hit_count, self.miss_count)
    }
}
