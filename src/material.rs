//! One material partition's ordered run of timesteps.
//!
//! A [`MaterialLevel`] owns the timestep sequence for one material of one
//! variable. The sequence is indexed directly by timestep number and may
//! contain holes (`None`) for timesteps never cached; it grows on demand to
//! `ts + 1` and never shrinks, so clearing a timestep leaves a hole rather
//! than renumbering later timesteps.
//!
//! This module is internal infrastructure; consumers go through
//! [`VariableCache`](crate::VariableCache).

extern crate alloc;

use crate::timestep::{IndexParams, TimestepLevel};
use alloc::string::String;
use alloc::vec::Vec;

/// The timestep sequence for one material (or for the "no material" sentinel).
#[derive(Debug)]
pub(crate) struct MaterialLevel {
    /// `None` is the sentinel for variables not partitioned by material.
    material: Option<String>,
    timesteps: Vec<Option<TimestepLevel>>,
}

impl MaterialLevel {
    pub(crate) fn new(material: Option<&str>) -> Self {
        Self {
            material: material.map(String::from),
            timesteps: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    #[inline]
    pub(crate) fn matches(&self, material: Option<&str>) -> bool {
        self.material.as_deref() == material
    }

    /// The timestep level at `ts`, created on demand.
    ///
    /// Grows the backing sequence with holes up to `ts + 1` entries.
    pub(crate) fn timestep_mut(&mut self, ts: usize, params: &IndexParams) -> &mut TimestepLevel {
        if self.timesteps.len() <= ts {
            self.timesteps.resize_with(ts + 1, || None);
        }
        self.timesteps[ts].get_or_insert_with(|| TimestepLevel::new(params))
    }

    #[inline]
    pub(crate) fn timestep(&self, ts: usize) -> Option<&TimestepLevel> {
        self.timesteps.get(ts).and_then(Option::as_ref)
    }

    /// Destroys the timestep level at `ts`, releasing every payload under it.
    ///
    /// No-op when the timestep was never cached or is past the end of the
    /// sequence. Returns the number of slots released.
    pub(crate) fn clear_timestep(&mut self, ts: usize) -> usize {
        match self.timesteps.get_mut(ts).and_then(Option::take) {
            Some(level) => level.len(),
            None => 0,
        }
    }

    /// Iterates over present timesteps as `(ts, level)` pairs.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &TimestepLevel)> {
        self.timesteps
            .iter()
            .enumerate()
            .filter_map(|(ts, level)| level.as_ref().map(|l| (ts, l)))
    }

    /// Total number of occupied slots across all timesteps.
    pub(crate) fn slot_count(&self) -> usize {
        self.iter().map(|(_, level)| level.len()).sum()
    }

    /// Sum of the byte-size estimates of all payloads under this material.
    pub(crate) fn estimated_size(&self) -> u64 {
        self.iter().map(|(_, level)| level.estimated_size()).sum()
    }
}
