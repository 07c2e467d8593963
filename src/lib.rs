#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Storage hierarchy
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ VariableCache                                                    │
//! │  ├── renderable forest          ├── opaque forest                │
//! │  │    VariableLevel (name, tag) │    VariableLevel (name, tag)   │
//! │  │     └── MaterialLevel ───────┴──── one per material (or none) │
//! │  │          └── TimestepLevel         Vec indexed by timestep    │
//! │  │               └── DomainSlot       hash map keyed by domain   │
//! │  │                    └── payload     handle or opaque value     │
//! │  └── identity side table              ObjectId → (partner, dom)  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Variable and material lookups are linear scans over small collections
//! (tens of variables, under twenty materials); the domain dimension — where
//! production datasets reach 50,000+ entries per timestep — is a hash map
//! with amortized O(1) point operations and occupancy-proportional iteration.
//!
//! ## Typical producer/consumer flow
//!
//! ```rust
//! use std::rc::Rc;
//! use varcache::{ObjectId, Renderable, RenderableHandle, TypeTag, VariableCache};
//!
//! struct Mesh {
//!     cells: usize,
//! }
//!
//! impl Renderable for Mesh {
//!     fn as_any(&self) -> &dyn std::any::Any {
//!         self
//!     }
//!
//!     fn estimated_size(&self) -> u64 {
//!         (self.cells * 48) as u64
//!     }
//! }
//!
//! let mut cache = VariableCache::new();
//!
//! // Producer: a file-format adapter just read domain 3 of timestep 0.
//! let mesh: RenderableHandle = Rc::new(Mesh { cells: 1024 });
//! cache
//!     .cache_renderable("pressure", TypeTag::Scalars, 0, 3, None, Rc::clone(&mesh))
//!     .unwrap();
//!
//! // Consumer: the pipeline asks before recomputing.
//! let hit = cache
//!     .get_renderable("pressure", TypeTag::Scalars, 0, 3, None)
//!     .expect("cached above");
//!
//! // Later, holding only the bare object, recover its provenance.
//! let key = cache
//!     .get_renderable_key(ObjectId::of_renderable(&hit), 3)
//!     .expect("still cached");
//! assert_eq!(key.variable, "pressure");
//! assert_eq!(key.timestep, 0);
//!
//! // The file for timestep 0 was re-read: everything under it goes.
//! cache.clear_timestep(0);
//! assert!(cache.is_empty());
//! ```
//!
//! ## Operation cost summary
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `cache_*` / `get_*` / `has_*` | O(variables + materials) scan + O(1) domain lookup |
//! | `get_*_key` (reverse lookup) | O(variables × materials × timesteps), one domain probe each |
//! | `clear_timestep` | O(slots released) |
//! | `clear_variables_with_substring` | O(variables) + O(slots released) |
//! | `estimate_total_size` / `dump` | O(occupied slots) |
//!
//! ## Modules
//!
//! - [`cache`]: the [`VariableCache`] facade and identity side table
//! - [`key`]: [`CacheKey`], [`TypeTag`], [`ObjectId`]
//! - [`item`]: payload types — [`Renderable`], [`OpaquePayload`], [`CachedItem`]
//! - [`config`]: [`VariableCacheConfig`]
//! - [`metrics`]: hit/miss/insertion counters and the [`CacheMetrics`] trait
//! - [`error`]: [`CacheError`]

#![no_std]

extern crate alloc;

/// The variable cache facade and the identity side table.
pub mod cache;

/// Cache configuration.
pub mod config;

/// Error types.
pub mod error;

/// Cached payload types: renderable handles and opaque payloads.
pub mod item;

/// Cache key types: variable/tag/timestep/domain/material and object identity.
pub mod key;

/// Metrics collection and reporting.
pub mod metrics;

/// One material partition's timestep sequence (internal).
pub(crate) mod material;

/// The hashed domain index for one timestep (internal).
pub(crate) mod timestep;

/// One cached variable and its material partitions (internal).
pub(crate) mod variable;

// Re-export the primary types
pub use cache::{IdentityPair, VariableCache};
pub use config::VariableCacheConfig;
pub use error::CacheError;
pub use item::{CachedItem, ItemKind, OpaquePayload, Renderable, RenderableHandle};
pub use key::{CacheKey, ObjectId, TypeTag};
pub use metrics::{CacheMetrics, CoreCacheMetrics, VariableCacheMetrics};
