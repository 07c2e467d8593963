//! Cache configuration.
//!
//! Configuration is a plain struct with public fields: create it literally,
//! no builder needed. Pass it to
//! [`VariableCache::init`](crate::VariableCache::init);
//! [`VariableCache::new`](crate::VariableCache::new) uses the defaults.
//!
//! # Examples
//!
//! ```
//! use varcache::config::VariableCacheConfig;
//! use varcache::VariableCache;
//!
//! let config = VariableCacheConfig {
//!     debug_size_estimation: true,
//!     expected_domains: 4096,
//! };
//! let cache = VariableCache::init(config, None);
//! assert!(cache.is_empty());
//! ```

use core::fmt;

/// Configuration for a [`VariableCache`](crate::VariableCache).
///
/// There are no capacity knobs: the cache never evicts on its own, so the
/// only tunables are diagnostics verbosity and a pre-allocation hint.
#[derive(Clone, Copy, Default)]
pub struct VariableCacheConfig {
    /// Emit per-variable `log::debug!` lines during
    /// [`estimate_total_size`](crate::VariableCache::estimate_total_size).
    ///
    /// Affects logging only, never behavior.
    pub debug_size_estimation: bool,

    /// Expected number of domains per timestep, used to pre-size each
    /// timestep's domain map. 0 disables pre-allocation.
    ///
    /// A good value for parallel engines is the dataset's domain count
    /// divided by the number of ranks; getting it wrong only costs rehashes.
    pub expected_domains: usize,
}

impl fmt::Debug for VariableCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableCacheConfig")
            .field("debug_size_estimation", &self.debug_size_estimation)
            .field("expected_domains", &self.expected_domains)
            .finish()
    }
}
