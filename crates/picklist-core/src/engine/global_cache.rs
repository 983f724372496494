//! Cross-assembly TTL cache for zero-argument resolutions.

use crate::config::OptionsConfig;
use crate::models::OptionList;
use mini_moka::sync::Cache;
use std::time::Duration;

/// Short-lived cache keyed by registry key, populated only for the
/// zero-argument signature.
///
/// Exists so that independently assembled services (or a loader whose state
/// was rebuilt, the remount case) can seed from a recent resolution instead
/// of repeating a remote fetch. Entries expire by TTL and are evicted lazily
/// by the underlying cache.
pub struct GlobalCache {
    entries: Cache<String, OptionList>,
}

impl GlobalCache {
    /// Create a cache with the default TTL.
    pub fn new() -> Self {
        Self::with_ttl(OptionsConfig::GLOBAL_CACHE_TTL)
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(OptionsConfig::GLOBAL_CACHE_CAPACITY)
                .build(),
        }
    }

    /// Get the cached snapshot for a key, if present and unexpired.
    pub fn get(&self, key: &str) -> Option<OptionList> {
        self.entries.get(&key.to_string())
    }

    /// Store a freshly resolved snapshot for a key.
    pub fn insert(&self, key: &str, items: OptionList) {
        self.entries.insert(key.to_string(), items);
    }

    /// Drop the entry for a key.
    pub fn invalidate(&self, key: &str) {
        self.entries.invalidate(&key.to_string());
    }
}

impl Default for GlobalCache {
    fn default() -> Self {
        Self::new()
    }
}
