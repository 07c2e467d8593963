//! The hashed domain index: one timestep's worth of cached domains.
//!
//! Domain ids are sparse non-negative integers, and production datasets can
//! carry more than 50,000 domains in one timestep. The index keeps point
//! lookup, insert, and removal amortized O(1) and iteration proportional to
//! occupancy. A hash map keyed by domain id meets all of those bounds,
//! including true removal: cleared domains are forgotten, not tombstoned, so
//! size estimation and iteration stay bounded by what is actually present.
//!
//! This module is internal infrastructure; consumers go through
//! [`VariableCache`](crate::VariableCache).

extern crate alloc;

use crate::error::CacheError;
use crate::item::CachedItem;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Sizing and hashing parameters threaded into index construction.
///
/// New `TimestepLevel`s are created lazily on first insert; this carries the
/// cache-wide hash builder and the pre-allocation hint down to that point.
#[derive(Debug, Clone)]
pub(crate) struct IndexParams {
    pub hash_builder: DefaultHashBuilder,
    /// Expected domain count per timestep; 0 means no pre-allocation.
    pub expected_domains: usize,
}

impl IndexParams {
    pub(crate) fn new(hash_builder: DefaultHashBuilder, expected_domains: usize) -> Self {
        Self {
            hash_builder,
            expected_domains,
        }
    }
}

/// One occupied storage cell: a domain id and the payload cached for it.
///
/// A `DomainSlot` exists only while it holds a payload; clearing a domain
/// removes the slot from its parent outright. The domain id is kept
/// redundantly on the slot (it is also the map key) so reverse lookup and
/// structural dumps can report it without walking back up the hierarchy.
#[derive(Debug)]
pub(crate) struct DomainSlot {
    domain: usize,
    item: CachedItem,
}

impl DomainSlot {
    pub(crate) fn new(domain: usize, item: CachedItem) -> Self {
        Self { domain, item }
    }

    #[inline]
    pub(crate) fn domain(&self) -> usize {
        self.domain
    }

    #[inline]
    pub(crate) fn item(&self) -> &CachedItem {
        &self.item
    }

    /// Replaces the payload, returning the prior one for release bookkeeping.
    ///
    /// The replacement must be of the same kind as the stored payload.
    pub(crate) fn replace(&mut self, item: CachedItem) -> Result<CachedItem, CacheError> {
        if item.kind() != self.item.kind() {
            return Err(CacheError::TypeMismatch {
                expected: self.item.kind(),
                found: item.kind(),
            });
        }
        Ok(core::mem::replace(&mut self.item, item))
    }

    #[allow(dead_code)]
    fn into_item(self) -> CachedItem {
        self.item
    }
}

/// Maps domain id to [`DomainSlot`] for one (variable, material, timestep).
#[derive(Debug)]
pub(crate) struct TimestepLevel {
    slots: HashMap<usize, DomainSlot, DefaultHashBuilder>,
}

impl TimestepLevel {
    pub(crate) fn new(params: &IndexParams) -> Self {
        Self {
            slots: HashMap::with_capacity_and_hasher(
                params.expected_domains,
                params.hash_builder.clone(),
            ),
        }
    }

    /// Inserts or replaces the payload for `domain`.
    ///
    /// Returns the prior payload when the domain was already occupied, so the
    /// caller can account for exactly one release. Replacing with a payload
    /// of a different kind fails without modifying the slot.
    pub(crate) fn insert(
        &mut self,
        domain: usize,
        item: CachedItem,
    ) -> Result<Option<CachedItem>, CacheError> {
        match self.slots.get_mut(&domain) {
            Some(slot) => slot.replace(item).map(Some),
            None => {
                self.slots.insert(domain, DomainSlot::new(domain, item));
                Ok(None)
            }
        }
    }

    #[inline]
    pub(crate) fn get(&self, domain: usize) -> Option<&CachedItem> {
        self.slots.get(&domain).map(DomainSlot::item)
    }

    /// Removes the slot for `domain`, returning its payload for release.
    #[allow(dead_code)]
    #[inline]
    pub(crate) fn remove(&mut self, domain: usize) -> Option<CachedItem> {
        self.slots.remove(&domain).map(DomainSlot::into_item)
    }

    /// Iterates over all present slots, in no particular order.
    ///
    /// Cost is proportional to occupancy, not to the domain id range.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &DomainSlot> {
        self.slots.values()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Sum of the byte-size estimates of all present payloads.
    pub(crate) fn estimated_size(&self) -> u64 {
        self.slots
            .values()
            .map(|slot| slot.item.estimated_size())
            .sum()
    }
}
