//! Cache metrics.
//!
//! Counters for cache activity, reported as a `BTreeMap<String, f64>` so
//! output ordering is deterministic across logs, tests, and CSV exports.
//!
//! Metrics are reporting only. In particular, none of these counters feed an
//! eviction policy; the cache has none.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Returns the current time in nanoseconds.
///
/// With the `std` feature enabled, returns nanoseconds since UNIX epoch.
/// In `no_std` environments, returns 0.
#[cfg(feature = "std")]
#[inline]
fn now_nanos() -> u64 {
    extern crate std;
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Returns 0 in no_std environments where system time is not available.
#[cfg(not(feature = "std"))]
#[inline]
fn now_nanos() -> u64 {
    0
}

/// Counters common to the cache's forward-lookup path.
///
/// Lookups (`get_*`) record hits and misses along with the byte-size estimate
/// of the object involved; existence checks and reverse lookups record
/// nothing. Insertions distinguish fresh slots from replacements, and every
/// release of a payload (replacement or clear) is counted once.
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Total number of lookups made against the cache.
    pub requests: u64,

    /// Lookups that found an entry.
    pub cache_hits: u64,

    /// Total estimated bytes served from cache (hits only).
    pub bytes_served_from_cache: u64,

    /// Total estimated bytes written into the cache.
    pub bytes_written_to_cache: u64,

    /// Fresh slot insertions.
    pub insertions: u64,

    /// Insertions that replaced an occupied slot.
    pub replacements: u64,

    /// Payloads released, by replacement or by explicit invalidation.
    pub releases: u64,

    /// `clear_timestep` calls observed.
    pub timesteps_cleared: u64,

    /// Whole variables removed by substring invalidation.
    pub variables_cleared: u64,

    /// Time of the most recent recorded event, in nanoseconds since UNIX
    /// epoch. 0 before any event, and always 0 without the `std` feature.
    pub last_updated_nanos: u64,
}

impl CoreCacheMetrics {
    /// Records a lookup that found an entry of the given estimated size.
    pub fn record_hit(&mut self, object_size: u64) {
        self.requests += 1;
        self.cache_hits += 1;
        self.bytes_served_from_cache += object_size;
        self.last_updated_nanos = now_nanos();
    }

    /// Records a lookup that found nothing.
    pub fn record_miss(&mut self) {
        self.requests += 1;
        self.last_updated_nanos = now_nanos();
    }

    /// Records a fresh insertion of the given estimated size.
    pub fn record_insertion(&mut self, object_size: u64) {
        self.insertions += 1;
        self.bytes_written_to_cache += object_size;
        self.last_updated_nanos = now_nanos();
    }

    /// Records an insertion that replaced an occupied slot.
    pub fn record_replacement(&mut self, object_size: u64) {
        self.replacements += 1;
        self.bytes_written_to_cache += object_size;
        self.releases += 1;
        self.last_updated_nanos = now_nanos();
    }

    /// Records `count` payloads released by explicit invalidation.
    pub fn record_invalidation(&mut self, count: u64) {
        self.releases += count;
        self.last_updated_nanos = now_nanos();
    }

    /// Hit rate in `[0.0, 1.0]`; 0.0 before any request.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Miss rate in `[0.0, 1.0]`; 0.0 before any request.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the counters to a `BTreeMap` for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert(
            "cache_misses".to_string(),
            (self.requests - self.cache_hits) as f64,
        );
        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        metrics.insert(
            "bytes_served_from_cache".to_string(),
            self.bytes_served_from_cache as f64,
        );
        metrics.insert(
            "bytes_written_to_cache".to_string(),
            self.bytes_written_to_cache as f64,
        );

        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("replacements".to_string(), self.replacements as f64);
        metrics.insert("releases".to_string(), self.releases as f64);
        metrics.insert(
            "timesteps_cleared".to_string(),
            self.timesteps_cleared as f64,
        );
        metrics.insert(
            "variables_cleared".to_string(),
            self.variables_cleared as f64,
        );

        metrics
    }
}

/// Metrics tracked by a [`VariableCache`](crate::VariableCache) instance.
#[derive(Debug, Default, Clone)]
pub struct VariableCacheMetrics {
    /// Counters for the forward-lookup path.
    pub core: CoreCacheMetrics,
}

impl VariableCacheMetrics {
    /// Converts all metrics to a `BTreeMap` for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        self.core.to_btreemap()
    }
}

/// Uniform metrics-reporting interface.
///
/// Keys are sorted alphabetically so repeated reports diff cleanly.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Cache-structure name for identification in reports.
    fn algorithm_name(&self) -> &'static str;
}

impl CacheMetrics for VariableCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "VariableCache"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_miss_accounting() {
        let mut m = CoreCacheMetrics::default();
        m.record_hit(100);
        m.record_hit(50);
        m.record_miss();
        assert_eq!(m.requests, 3);
        assert_eq!(m.cache_hits, 2);
        assert_eq!(m.bytes_served_from_cache, 150);
        assert!((m.hit_rate() - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.miss_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rates_are_zero_without_requests() {
        let m = CoreCacheMetrics::default();
        assert_eq!(m.hit_rate(), 0.0);
        assert_eq!(m.miss_rate(), 0.0);
    }

    #[test]
    fn test_replacement_counts_one_release() {
        let mut m = CoreCacheMetrics::default();
        m.record_insertion(10);
        m.record_replacement(20);
        assert_eq!(m.insertions, 1);
        assert_eq!(m.replacements, 1);
        assert_eq!(m.releases, 1);
        assert_eq!(m.bytes_written_to_cache, 30);
    }

    #[test]
    fn test_btreemap_report_is_complete() {
        let mut m = VariableCacheMetrics::default();
        m.core.record_hit(10);
        m.core.record_miss();
        let report = m.metrics();
        assert_eq!(report.get("requests"), Some(&2.0));
        assert_eq!(report.get("cache_hits"), Some(&1.0));
        assert_eq!(report.get("cache_misses"), Some(&1.0));
        assert_eq!(report.get("hit_rate"), Some(&0.5));
        assert_eq!(m.algorithm_name(), "VariableCache");
    }
}
