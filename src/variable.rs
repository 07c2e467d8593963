//! One cached variable: a (name, type tag) pair and its material partitions.
//!
//! Material counts are small (typically under 20), so material lookup is a
//! plain linear scan; the performance-sensitive dimension is the domain
//! index underneath (see [`crate::timestep`]).
//!
//! This module is internal infrastructure; consumers go through
//! [`VariableCache`](crate::VariableCache).

extern crate alloc;

use crate::key::TypeTag;
use crate::material::MaterialLevel;
use crate::timestep::{IndexParams, TimestepLevel};
use alloc::string::String;
use alloc::vec::Vec;

/// The material partitions cached for one (variable name, type tag) pair.
#[derive(Debug)]
pub(crate) struct VariableLevel {
    variable: String,
    tag: TypeTag,
    materials: Vec<MaterialLevel>,
}

impl VariableLevel {
    pub(crate) fn new(variable: &str, tag: TypeTag) -> Self {
        Self {
            variable: String::from(variable),
            tag,
            materials: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn variable(&self) -> &str {
        &self.variable
    }

    #[inline]
    pub(crate) fn tag(&self) -> TypeTag {
        self.tag
    }

    #[inline]
    pub(crate) fn matches(&self, variable: &str, tag: TypeTag) -> bool {
        self.tag == tag && self.variable == variable
    }

    /// Case-sensitive substring test against the variable name, used by bulk
    /// invalidation.
    #[inline]
    pub(crate) fn name_contains(&self, substr: &str) -> bool {
        self.variable.contains(substr)
    }

    /// The material level for `material`, created on demand.
    pub(crate) fn material_mut(&mut self, material: Option<&str>) -> &mut MaterialLevel {
        let idx = match self.materials.iter().position(|m| m.matches(material)) {
            Some(idx) => idx,
            None => {
                self.materials.push(MaterialLevel::new(material));
                self.materials.len() - 1
            }
        };
        &mut self.materials[idx]
    }

    #[inline]
    pub(crate) fn material(&self, material: Option<&str>) -> Option<&MaterialLevel> {
        self.materials.iter().find(|m| m.matches(material))
    }

    /// Convenience point lookup used by the facade.
    pub(crate) fn timestep(&self, material: Option<&str>, ts: usize) -> Option<&TimestepLevel> {
        self.material(material).and_then(|m| m.timestep(ts))
    }

    /// The timestep level for `(material, ts)`, created on demand.
    pub(crate) fn timestep_mut(
        &mut self,
        material: Option<&str>,
        ts: usize,
        params: &IndexParams,
    ) -> &mut TimestepLevel {
        self.material_mut(material).timestep_mut(ts, params)
    }

    /// Clears `ts` in every material partition; returns slots released.
    pub(crate) fn clear_timestep(&mut self, ts: usize) -> usize {
        self.materials
            .iter_mut()
            .map(|m| m.clear_timestep(ts))
            .sum()
    }

    /// Iterates over the material partitions.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &MaterialLevel> {
        self.materials.iter()
    }

    /// Total number of occupied slots under this variable.
    pub(crate) fn slot_count(&self) -> usize {
        self.materials.iter().map(MaterialLevel::slot_count).sum()
    }

    /// Sum of the byte-size estimates of all payloads under this variable.
    pub(crate) fn estimated_size(&self) -> u64 {
        self.materials.iter().map(MaterialLevel::estimated_size).sum()
    }
}
