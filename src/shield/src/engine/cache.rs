//! Role-decision cache
//!
//! Caches `(role, permission) -> bool` answers from the role map. User
//! overrides are never cached here.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::types::{PermissionName, Role};

type CacheKey = (Role, PermissionName);

/// Cached entry with TTL and the snapshot generation it was computed under
#[derive(Clone, Copy)]
struct CachedEntry {
    allowed: bool,
    generation: u64,
    cached_at: Instant,
}

impl CachedEntry {
    fn new(allowed: bool, generation: u64) -> Self {
        Self {
            allowed,
            generation,
            cached_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }
}

/// Role-default decision cache
///
/// Entries from an older snapshot generation are treated as misses, so a
/// lookup racing a reseed can never serve a pre-reseed answer even if it
/// lands after `clear()`.
pub struct RoleDecisionCache {
    /// In-memory cache (thread-safe)
    entries: Arc<DashMap<CacheKey, CachedEntry>>,

    /// Cache configuration
    config: CacheConfig,

    /// Cache statistics
    stats: Arc<DashMap<&'static str, usize>>,
}

impl RoleDecisionCache {
    /// Create a new cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            config,
            stats: Arc::new(DashMap::new()),
        }
    }

    /// Get a cached role decision computed under `generation`
    pub fn get(&self, role: Role, permission: &str, generation: u64) -> Option<bool> {
        let key = (role, permission.to_string());

        // Copy out so the shard guard is released before any removal.
        let cached = self.entries.get(&key).map(|entry| *entry);

        if let Some(entry) = cached {
            if entry.generation != generation {
                self.entries.remove(&key);
                self.increment_stat("misses");
                return None;
            }

            if entry.is_expired(self.config.ttl()) {
                self.entries.remove(&key);
                self.increment_stat("expirations");
                return None;
            }

            self.increment_stat("hits");
            return Some(entry.allowed);
        }

        self.increment_stat("misses");
        None
    }

    /// Store a role decision
    pub fn put(&self, role: Role, permission: &str, generation: u64, allowed: bool) {
        if self.entries.len() >= self.config.capacity {
            self.evict();
        }

        self.entries
            .insert((role, permission.to_string()), CachedEntry::new(allowed, generation));
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.entries.clear();
        self.stats.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            expirations: self.get_stat("expirations"),
            entries: self.entries.len(),
            max_entries: self.config.capacity,
        }
    }

    /// Evict roughly 10% of entries, expired ones first
    fn evict(&self) {
        let ttl = self.config.ttl();
        self.entries.retain(|_, entry| !entry.is_expired(ttl));

        if self.entries.len() < self.config.capacity {
            return;
        }

        let to_remove = (self.config.capacity / 10).max(1);
        let mut removed = 0;
        self.entries.retain(|_, _| {
            if removed < to_remove {
                removed += 1;
                false
            } else {
                true
            }
        });
    }

    fn increment_stat(&self, key: &'static str) {
        self.stats
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &'static str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub expirations: usize,
    pub entries: usize,
    pub max_entries: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with(ttl_secs: u64, capacity: usize) -> RoleDecisionCache {
        RoleDecisionCache::new(CacheConfig {
            enabled: true,
            capacity,
            ttl_secs,
        })
    }

    #[test]
    fn test_cache_put_get() {
        let cache = cache_with(60, 100);

        assert!(cache.get(Role::Sale, "order:create", 1).is_none());
        cache.put(Role::Sale, "order:create", 1, true);
        assert_eq!(cache.get(Role::Sale, "order:create", 1), Some(true));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_stale_generation_is_a_miss() {
        let cache = cache_with(60, 100);
        cache.put(Role::Kitchen, "order:read", 1, true);

        assert!(cache.get(Role::Kitchen, "order:read", 2).is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_zero_ttl_expires() {
        let cache = cache_with(0, 100);
        cache.put(Role::Kitchen, "order:read", 1, false);

        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(Role::Kitchen, "order:read", 1).is_none());
        assert!(cache.stats().expirations > 0);
    }

    #[test]
    fn test_capacity_bounded() {
        let cache = cache_with(60, 10);
        for i in 0..50 {
            cache.put(Role::Sale, &format!("order:action{}", i), 1, true);
        }

        assert!(cache.stats().entries <= 10);
    }

    #[test]
    fn test_cache_clear() {
        let cache = cache_with(60, 100);
        cache.put(Role::Weighing, "order:read", 1, true);
        assert_eq!(cache.stats().entries, 1);

        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }
}
