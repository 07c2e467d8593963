//! The variable cache facade.
//!
//! [`VariableCache`] holds two independent forests of cached variables — one
//! for shared renderable handles, one for owned opaque payloads — plus a side
//! table mapping object identities to registered partner identities. Producers
//! (file-format adapters) insert what they computed for a key; consumers look
//! up before recomputing; invalidation is explicit and caller-driven.
//!
//! The two forests never interact: caching a renderable under a key says
//! nothing about the opaque side of the same key, and a lookup in the wrong
//! forest is an ordinary miss.

extern crate alloc;

use crate::config::VariableCacheConfig;
use crate::error::CacheError;
use crate::item::{CachedItem, OpaquePayload, RenderableHandle};
use crate::key::{CacheKey, ObjectId, TypeTag};
use crate::metrics::{CacheMetrics, VariableCacheMetrics};
use crate::timestep::IndexParams;
use crate::variable::VariableLevel;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use log::{debug, trace};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// A registered (partner identity, domain) pair in the identity side table.
///
/// See [`VariableCache::add_identity_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityPair {
    /// Identity of the registered partner object.
    pub partner: ObjectId,
    /// The domain both objects belong to, usable as the domain argument to
    /// the reverse-lookup operations.
    pub domain: usize,
}

/// Multi-key cache for renderable objects and opaque auxiliary payloads.
///
/// Entries are keyed by `(variable, type tag, timestep, domain, material)`.
/// Lookups that find nothing return `None`; structural errors
/// ([`CacheError`]) indicate caller bugs and are never transient.
///
/// One instance must be confined to one thread; there is no internal
/// locking. Parallel engines run one cache per rank.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use varcache::{Renderable, RenderableHandle, TypeTag, VariableCache};
///
/// struct Mesh;
/// impl Renderable for Mesh {
///     fn as_any(&self) -> &dyn std::any::Any {
///         self
///     }
/// }
///
/// let mut cache = VariableCache::new();
/// let mesh: RenderableHandle = Rc::new(Mesh);
///
/// cache
///     .cache_renderable("pressure", TypeTag::Scalars, 0, 3, None, Rc::clone(&mesh))
///     .unwrap();
/// assert!(cache
///     .get_renderable("pressure", TypeTag::Scalars, 0, 3, None)
///     .is_some());
///
/// cache.clear_timestep(0);
/// assert!(cache
///     .get_renderable("pressure", TypeTag::Scalars, 0, 3, None)
///     .is_none());
/// ```
pub struct VariableCache {
    config: VariableCacheConfig,
    params: IndexParams,
    renderables: Vec<VariableLevel>,
    opaques: Vec<VariableLevel>,
    identity_pairs: HashMap<ObjectId, IdentityPair, DefaultHashBuilder>,
    metrics: VariableCacheMetrics,
    /// Occupied slot count across both forests.
    entries: usize,
}

impl VariableCache {
    /// Creates a cache with the default configuration.
    pub fn new() -> Self {
        Self::init(VariableCacheConfig::default(), None)
    }

    /// Creates a cache from a configuration and an optional hash builder.
    ///
    /// Pass a hash builder for deterministic hashing; `None` uses the
    /// default.
    pub fn init(config: VariableCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        let hash_builder = hasher.unwrap_or_default();
        Self {
            config,
            params: IndexParams::new(hash_builder.clone(), config.expected_domains),
            renderables: Vec::new(),
            opaques: Vec::new(),
            identity_pairs: HashMap::with_hasher(hash_builder),
            metrics: VariableCacheMetrics::default(),
            entries: 0,
        }
    }

    /// The configuration this cache was created with.
    #[inline]
    pub fn config(&self) -> &VariableCacheConfig {
        &self.config
    }

    /// Number of occupied slots across both forests.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries
    }

    /// True when no slot is occupied in either forest.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// The metrics counters for this instance.
    #[inline]
    pub fn cache_metrics(&self) -> &VariableCacheMetrics {
        &self.metrics
    }

    // ------------------------------------------------------------------
    // Renderable forest
    // ------------------------------------------------------------------

    /// Caches a shared renderable handle under the given key.
    ///
    /// Storing clones the handle (refcount increment); replacing an occupied
    /// slot releases the prior handle exactly once. The cache never assumes
    /// it is the sole or last owner of the underlying object.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] when `variable` is empty.
    pub fn cache_renderable(
        &mut self,
        variable: &str,
        tag: TypeTag,
        ts: usize,
        domain: usize,
        material: Option<&str>,
        handle: RenderableHandle,
    ) -> Result<(), CacheError> {
        let size = handle.estimated_size();
        let replaced = Self::insert_item(
            &mut self.renderables,
            &self.params,
            variable,
            tag,
            ts,
            domain,
            material,
            CachedItem::Renderable(handle),
        )?;
        self.account_insertion(replaced.is_some(), size);
        Ok(())
    }

    /// Looks up a renderable handle, returning another share on a hit.
    ///
    /// A pure lookup: no computation, no fallback, no eviction. Records a
    /// hit or miss in the metrics.
    pub fn get_renderable(
        &mut self,
        variable: &str,
        tag: TypeTag,
        ts: usize,
        domain: usize,
        material: Option<&str>,
    ) -> Option<RenderableHandle> {
        let found = Self::lookup(&self.renderables, variable, tag, ts, domain, material)
            .and_then(CachedItem::as_renderable)
            .cloned();
        match &found {
            Some(handle) => self.metrics.core.record_hit(handle.estimated_size()),
            None => self.metrics.core.record_miss(),
        }
        found
    }

    /// True when a renderable is cached under the given key.
    ///
    /// Does not touch ownership or metrics.
    pub fn has_renderable(
        &self,
        variable: &str,
        tag: TypeTag,
        ts: usize,
        domain: usize,
        material: Option<&str>,
    ) -> bool {
        Self::lookup(&self.renderables, variable, tag, ts, domain, material)
            .and_then(CachedItem::as_renderable)
            .is_some()
    }

    /// Recovers the cache key of the renderable with the given identity.
    ///
    /// The caller must supply the domain: reverse lookup never scans across
    /// domains. Cost is proportional to (variables × materials × timesteps),
    /// each contributing one domain point lookup.
    pub fn get_renderable_key(&self, id: ObjectId, domain: usize) -> Option<CacheKey> {
        Self::reverse_lookup(&self.renderables, id, domain)
    }

    // ------------------------------------------------------------------
    // Opaque forest
    // ------------------------------------------------------------------

    /// Caches an opaque payload under the given key.
    ///
    /// The cache owns the payload outright; replacing an occupied slot drops
    /// the prior payload exactly once.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] when `variable` is empty.
    pub fn cache_opaque(
        &mut self,
        variable: &str,
        tag: TypeTag,
        ts: usize,
        domain: usize,
        material: Option<&str>,
        payload: OpaquePayload,
    ) -> Result<(), CacheError> {
        let size = payload.size();
        let replaced = Self::insert_item(
            &mut self.opaques,
            &self.params,
            variable,
            tag,
            ts,
            domain,
            material,
            CachedItem::Opaque(payload),
        )?;
        self.account_insertion(replaced.is_some(), size);
        Ok(())
    }

    /// Looks up an opaque payload, returning a borrowed view on a hit.
    ///
    /// The cache retains ownership; downcast the view with
    /// [`Any::downcast_ref`]. Records a hit or miss in the metrics.
    pub fn get_opaque(
        &mut self,
        variable: &str,
        tag: TypeTag,
        ts: usize,
        domain: usize,
        material: Option<&str>,
    ) -> Option<&dyn Any> {
        let size = Self::lookup(&self.opaques, variable, tag, ts, domain, material)
            .map(CachedItem::estimated_size);
        match size {
            Some(size) => self.metrics.core.record_hit(size),
            None => {
                self.metrics.core.record_miss();
                return None;
            }
        }
        Self::lookup(&self.opaques, variable, tag, ts, domain, material)
            .and_then(CachedItem::as_opaque)
            .map(OpaquePayload::value)
    }

    /// True when an opaque payload is cached under the given key.
    ///
    /// Does not touch ownership or metrics. A key holding only a renderable
    /// returns `false`: the forests are independent.
    pub fn has_opaque(
        &self,
        variable: &str,
        tag: TypeTag,
        ts: usize,
        domain: usize,
        material: Option<&str>,
    ) -> bool {
        Self::lookup(&self.opaques, variable, tag, ts, domain, material)
            .and_then(CachedItem::as_opaque)
            .is_some()
    }

    /// Recovers the cache key of the opaque payload with the given identity.
    ///
    /// Same domain-must-be-supplied contract as
    /// [`get_renderable_key`](Self::get_renderable_key).
    pub fn get_opaque_key(&self, id: ObjectId, domain: usize) -> Option<CacheKey> {
        Self::reverse_lookup(&self.opaques, id, domain)
    }

    // ------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------

    /// Removes everything cached for timestep `ts`, in both forests.
    ///
    /// Every released renderable handle is dropped (refcount decrement) and
    /// every released opaque payload destroyed, exactly once each. Entries at
    /// other timesteps are untouched. No-op for timesteps never cached.
    pub fn clear_timestep(&mut self, ts: usize) {
        let released: usize = self
            .renderables
            .iter_mut()
            .chain(self.opaques.iter_mut())
            .map(|level| level.clear_timestep(ts))
            .sum();
        self.entries -= released;
        self.metrics.core.record_invalidation(released as u64);
        self.metrics.core.timesteps_cleared += 1;
        trace!("clear_timestep({ts}): released {released} slots");
    }

    /// Removes every renderable-forest variable whose name contains `substr`.
    ///
    /// Matching is case-sensitive. The whole variable goes — every material,
    /// timestep, and domain under it — and each payload is released exactly
    /// once. The opaque forest is not searched.
    pub fn clear_variables_with_substring(&mut self, substr: &str) {
        let mut released = 0usize;
        let mut removed = 0u64;
        self.renderables.retain(|level| {
            if level.name_contains(substr) {
                released += level.slot_count();
                removed += 1;
                false
            } else {
                true
            }
        });
        self.entries -= released;
        self.metrics.core.record_invalidation(released as u64);
        self.metrics.core.variables_cleared += removed;
        trace!(
            "clear_variables_with_substring({substr:?}): removed {removed} variables, {released} slots"
        );
    }

    // ------------------------------------------------------------------
    // Identity side table
    // ------------------------------------------------------------------

    /// Registers `partner` (with its domain) as the pair of `object`.
    ///
    /// The side table serves downstream code that holds a copy or transform
    /// of a cached object and needs to map its identity back to the original
    /// object's identity before reverse lookup.
    ///
    /// The table's lifecycle is independent of the forward cache: evicting a
    /// cache entry via [`clear_timestep`](Self::clear_timestep) or
    /// [`clear_variables_with_substring`](Self::clear_variables_with_substring)
    /// leaves registered pairs in place, and a pair whose objects are gone is
    /// still findable. Callers own removal via
    /// [`remove_identity_pair`](Self::remove_identity_pair).
    pub fn add_identity_pair(&mut self, object: ObjectId, partner: ObjectId, domain: usize) {
        self.identity_pairs
            .insert(object, IdentityPair { partner, domain });
    }

    /// Unregisters the pair for `object`, returning it if present.
    pub fn remove_identity_pair(&mut self, object: ObjectId) -> Option<IdentityPair> {
        self.identity_pairs.remove(&object)
    }

    /// The registered pair for `object`, if any.
    pub fn find_identity_pair(&self, object: ObjectId) -> Option<IdentityPair> {
        self.identity_pairs.get(&object).copied()
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Walks both forests and sums the byte-size estimates of every payload.
    ///
    /// Renderables report their structural estimate via
    /// [`Renderable::estimated_size`](crate::Renderable::estimated_size);
    /// opaque payloads report their caller-supplied hint (default 0). The
    /// result is for memory reporting only and never drives eviction. With
    /// [`VariableCacheConfig::debug_size_estimation`] set, one `log::debug!`
    /// line is emitted per variable.
    pub fn estimate_total_size(&self) -> u64 {
        let mut total = 0;
        for (label, forest) in [
            ("renderable", &self.renderables),
            ("opaque", &self.opaques),
        ] {
            for level in forest.iter() {
                let size = level.estimated_size();
                if self.config.debug_size_estimation {
                    debug!(
                        "size estimate: {label} {} ({}) = {size} bytes",
                        level.variable(),
                        level.tag()
                    );
                }
                total += size;
            }
        }
        if self.config.debug_size_estimation {
            debug!("size estimate: total = {total} bytes");
        }
        total
    }

    /// Writes a full structural dump of both forests, for debugging.
    ///
    /// Output is ordered variable → material → timestep → domain, with
    /// domains sorted so repeated dumps diff cleanly.
    pub fn dump(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "VariableCache: {} entries", self.entries)?;
        Self::dump_forest(out, "renderable objects", &self.renderables)?;
        Self::dump_forest(out, "opaque payloads", &self.opaques)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn insert_item(
        forest: &mut Vec<VariableLevel>,
        params: &IndexParams,
        variable: &str,
        tag: TypeTag,
        ts: usize,
        domain: usize,
        material: Option<&str>,
        item: CachedItem,
    ) -> Result<Option<CachedItem>, CacheError> {
        if variable.is_empty() {
            return Err(CacheError::invalid_argument(
                "variable name must not be empty",
            ));
        }
        let idx = match forest.iter().position(|l| l.matches(variable, tag)) {
            Some(idx) => idx,
            None => {
                forest.push(VariableLevel::new(variable, tag));
                forest.len() - 1
            }
        };
        forest[idx]
            .timestep_mut(material, ts, params)
            .insert(domain, item)
    }

    fn account_insertion(&mut self, replaced: bool, size: u64) {
        if replaced {
            self.metrics.core.record_replacement(size);
        } else {
            self.metrics.core.record_insertion(size);
            self.entries += 1;
        }
    }

    fn lookup<'a>(
        forest: &'a [VariableLevel],
        variable: &str,
        tag: TypeTag,
        ts: usize,
        domain: usize,
        material: Option<&str>,
    ) -> Option<&'a CachedItem> {
        forest
            .iter()
            .find(|l| l.matches(variable, tag))?
            .timestep(material, ts)?
            .get(domain)
    }

    fn reverse_lookup(forest: &[VariableLevel], id: ObjectId, domain: usize) -> Option<CacheKey> {
        for level in forest {
            for mat in level.iter() {
                for (ts, timestep) in mat.iter() {
                    // One point lookup for the supplied domain only.
                    if let Some(item) = timestep.get(domain) {
                        if item.id() == id {
                            return Some(CacheKey {
                                variable: String::from(level.variable()),
                                tag: level.tag(),
                                timestep: ts,
                                domain,
                                material: mat.material().map(String::from),
                            });
                        }
                    }
                }
            }
        }
        None
    }

    fn dump_forest(
        out: &mut dyn fmt::Write,
        label: &str,
        forest: &[VariableLevel],
    ) -> fmt::Result {
        writeln!(out, "{label}:")?;
        for level in forest {
            writeln!(out, "  {} ({})", level.variable(), level.tag())?;
            for mat in level.iter() {
                writeln!(out, "    material {}", mat.material().unwrap_or("<none>"))?;
                for (ts, timestep) in mat.iter() {
                    writeln!(out, "      timestep {ts}: {} domains", timestep.len())?;
                    let mut slots: Vec<_> = timestep
                        .iter()
                        .map(|slot| {
                            (slot.domain(), slot.item().kind(), slot.item().estimated_size())
                        })
                        .collect();
                    slots.sort_unstable_by_key(|&(domain, _, _)| domain);
                    for (domain, kind, size) in slots {
                        writeln!(out, "        domain {domain}: {kind}, ~{size} bytes")?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for VariableCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VariableCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableCache")
            .field("entries", &self.entries)
            .field("renderable_variables", &self.renderables.len())
            .field("opaque_variables", &self.opaques.len())
            .field("identity_pairs", &self.identity_pairs.len())
            .field("config", &self.config)
            .finish()
    }
}

impl CacheMetrics for VariableCache {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Renderable;
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;

    struct TestMesh {
        cells: usize,
    }

    impl Renderable for TestMesh {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn estimated_size(&self) -> u64 {
            (self.cells * 8) as u64
        }
    }

    fn mesh(cells: usize) -> RenderableHandle {
        Rc::new(TestMesh { cells })
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = VariableCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.estimate_total_size(), 0);
    }

    #[test]
    fn test_empty_variable_name_rejected() {
        let mut cache = VariableCache::new();
        let err = cache
            .cache_renderable("", TypeTag::Scalars, 0, 0, None, mesh(1))
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidArgument(_)));
        let err = cache
            .cache_opaque("", TypeTag::Arrays, 0, 0, None, OpaquePayload::new(1u8))
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidArgument(_)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_len_tracks_insert_replace_clear() {
        let mut cache = VariableCache::new();
        cache
            .cache_renderable("a", TypeTag::Scalars, 0, 0, None, mesh(1))
            .unwrap();
        cache
            .cache_renderable("a", TypeTag::Scalars, 0, 1, None, mesh(1))
            .unwrap();
        assert_eq!(cache.len(), 2);

        // Replacement does not change the entry count.
        cache
            .cache_renderable("a", TypeTag::Scalars, 0, 0, None, mesh(2))
            .unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear_timestep(0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_same_name_different_tag_are_distinct() {
        let mut cache = VariableCache::new();
        cache
            .cache_renderable("v", TypeTag::Scalars, 0, 0, None, mesh(1))
            .unwrap();
        cache
            .cache_renderable("v", TypeTag::Vectors, 0, 0, None, mesh(3))
            .unwrap();
        assert_eq!(cache.len(), 2);
        let scalar = cache
            .get_renderable("v", TypeTag::Scalars, 0, 0, None)
            .unwrap();
        assert_eq!(scalar.estimated_size(), 8);
        let vector = cache
            .get_renderable("v", TypeTag::Vectors, 0, 0, None)
            .unwrap();
        assert_eq!(vector.estimated_size(), 24);
    }

    #[test]
    fn test_forests_are_independent() {
        let mut cache = VariableCache::new();
        cache
            .cache_renderable("pressure", TypeTag::Scalars, 0, 3, None, mesh(4))
            .unwrap();
        assert!(!cache.has_opaque("pressure", TypeTag::Scalars, 0, 3, None));
        assert!(cache
            .get_opaque("pressure", TypeTag::Scalars, 0, 3, None)
            .is_none());
        assert!(cache.has_renderable("pressure", TypeTag::Scalars, 0, 3, None));
    }

    #[test]
    fn test_identity_pairs_are_independent_of_forward_cache() {
        let mut cache = VariableCache::new();
        let original = mesh(2);
        let copy = mesh(2);
        let original_id = ObjectId::of_renderable(&original);
        let copy_id = ObjectId::of_renderable(&copy);

        cache
            .cache_renderable("t", TypeTag::Dataset, 1, 5, None, Rc::clone(&original))
            .unwrap();
        cache.add_identity_pair(copy_id, original_id, 5);

        // Evicting the cached entry leaves the pair registered.
        cache.clear_timestep(1);
        let pair = cache.find_identity_pair(copy_id).unwrap();
        assert_eq!(pair.partner, original_id);
        assert_eq!(pair.domain, 5);

        assert_eq!(cache.remove_identity_pair(copy_id), Some(pair));
        assert!(cache.find_identity_pair(copy_id).is_none());
        assert!(cache.remove_identity_pair(copy_id).is_none());
    }

    #[test]
    fn test_metrics_follow_operations() {
        let mut cache = VariableCache::new();
        cache
            .cache_renderable("a", TypeTag::Scalars, 0, 0, None, mesh(1))
            .unwrap();
        let _ = cache.get_renderable("a", TypeTag::Scalars, 0, 0, None);
        let _ = cache.get_renderable("a", TypeTag::Scalars, 0, 1, None);

        let report = cache.metrics();
        assert_eq!(report.get("insertions"), Some(&1.0));
        assert_eq!(report.get("cache_hits"), Some(&1.0));
        assert_eq!(report.get("cache_misses"), Some(&1.0));
        assert_eq!(report.get("hit_rate"), Some(&0.5));
        assert_eq!(cache.algorithm_name(), "VariableCache");

        cache
            .cache_renderable("a", TypeTag::Scalars, 0, 0, None, mesh(2))
            .unwrap();
        let report = cache.metrics();
        assert_eq!(report.get("replacements"), Some(&1.0));
        assert_eq!(report.get("releases"), Some(&1.0));

        cache.clear_timestep(0);
        let report = cache.metrics();
        assert_eq!(report.get("timesteps_cleared"), Some(&1.0));
        assert_eq!(report.get("releases"), Some(&2.0));
    }

    #[test]
    fn test_has_checks_do_not_move_metrics() {
        let mut cache = VariableCache::new();
        cache
            .cache_opaque("a", TypeTag::Arrays, 0, 0, None, OpaquePayload::new(1u8))
            .unwrap();
        assert!(cache.has_opaque("a", TypeTag::Arrays, 0, 0, None));
        assert!(!cache.has_renderable("a", TypeTag::Arrays, 0, 0, None));
        assert_eq!(cache.metrics().get("requests"), Some(&0.0));
    }

    #[test]
    fn test_estimate_total_size_sums_both_forests() {
        let mut cache = VariableCache::new();
        cache
            .cache_renderable("m", TypeTag::Dataset, 0, 0, None, mesh(10))
            .unwrap();
        cache
            .cache_opaque(
                "ids",
                TypeTag::Arrays,
                0,
                0,
                None,
                OpaquePayload::with_size(vec![0u64; 4], 32),
            )
            .unwrap();
        assert_eq!(cache.estimate_total_size(), 80 + 32);
        cache.clear_timestep(0);
        assert_eq!(cache.estimate_total_size(), 0);
    }

    #[test]
    fn test_dump_lists_hierarchy() {
        let mut cache = VariableCache::new();
        cache
            .cache_renderable("pressure", TypeTag::Scalars, 2, 7, Some("iron"), mesh(1))
            .unwrap();
        cache
            .cache_opaque("ids", TypeTag::Arrays, 0, 0, None, OpaquePayload::new(0u8))
            .unwrap();

        let mut out = String::new();
        cache.dump(&mut out).unwrap();
        assert!(out.contains("renderable objects:"));
        assert!(out.contains("opaque payloads:"));
        assert!(out.contains("pressure (SCALARS)"));
        assert!(out.contains("material iron"));
        assert!(out.contains("timestep 2"));
        assert!(out.contains("domain 7"));
        assert!(out.contains("ids (ARRAYS)"));
        assert!(out.contains("material <none>"));
    }

    #[test]
    fn test_debug_impl() {
        let cache = VariableCache::new();
        let s = format!("{cache:?}");
        assert!(s.contains("VariableCache"));
        assert!(s.contains("entries"));
    }

    #[test]
    fn test_reverse_lookup_requires_matching_domain() {
        let mut cache = VariableCache::new();
        let handle = mesh(1);
        let id = ObjectId::of_renderable(&handle);
        cache
            .cache_renderable("v", TypeTag::Scalars, 0, 9, None, Rc::clone(&handle))
            .unwrap();

        let key = cache.get_renderable_key(id, 9).unwrap();
        assert_eq!(key.variable, "v");
        assert_eq!(key.timestep, 0);
        assert_eq!(key.domain, 9);

        // The caller supplies the domain; a wrong domain is a miss.
        assert!(cache.get_renderable_key(id, 8).is_none());
    }

    #[test]
    fn test_reverse_lookup_walks_materials_and_timesteps() {
        let mut cache = VariableCache::new();
        let wanted = mesh(1);
        let id = ObjectId::of_renderable(&wanted);
        for ts in 0..4 {
            cache
                .cache_renderable("v", TypeTag::Scalars, ts, 3, Some("iron"), mesh(1))
                .unwrap();
        }
        cache
            .cache_renderable("v", TypeTag::Scalars, 2, 3, Some("copper"), Rc::clone(&wanted))
            .unwrap();

        let key = cache.get_renderable_key(id, 3).unwrap();
        assert_eq!(key.material.as_deref(), Some("copper"));
        assert_eq!(key.timestep, 2);
    }

    #[test]
    fn test_opaque_view_downcasts() {
        let mut cache = VariableCache::new();
        let ids: Vec<u64> = vec![5, 6, 7];
        cache
            .cache_opaque("gids", TypeTag::Arrays, 0, 1, None, OpaquePayload::new(ids))
            .unwrap();
        let view = cache.get_opaque("gids", TypeTag::Arrays, 0, 1, None).unwrap();
        assert_eq!(view.downcast_ref::<Vec<u64>>().unwrap(), &vec![5, 6, 7]);
    }
}
