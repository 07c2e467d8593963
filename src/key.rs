//! Cache key types.
//!
//! A cache entry is addressed by the five-part tuple
//! `(variable name, type tag, timestep, domain, material)`:
//!
//! - **variable name**: the field or mesh name as the producer knows it.
//! - **type tag**: a discriminator separating semantically different payloads
//!   that may share a variable name (a scalar field and a label field can both
//!   be called `"pressure"`). Tags are opaque to the cache; only equality
//!   matters.
//! - **timestep**: index into the dataset's time series.
//! - **domain**: one spatial partition ("piece") of the dataset at that
//!   timestep. Production datasets can have tens of thousands of domains.
//! - **material**: optional named substance partition orthogonal to the domain
//!   decomposition; `None` for variables not partitioned by material.
//!
//! Timestep and domain are `usize` throughout: the ids are non-negative by
//! construction, so there is no runtime rejection path for negative values.
//!
//! [`ObjectId`] is the pointer-derived identity used for reverse lookup —
//! recovering a [`CacheKey`] from a bare payload after downstream code has
//! lost track of where the payload came from.

extern crate alloc;

use alloc::rc::Rc;
use alloc::string::String;
use core::any::Any;
use core::fmt;

/// Discriminator separating different classes of cached payload that may
/// share a variable name.
///
/// The string forms returned by [`TypeTag::as_str`] are the stable,
/// caller-visible vocabulary; [`TypeTag::parse`] accepts exactly those forms.
///
/// # Examples
///
/// ```
/// use varcache::TypeTag;
///
/// assert_eq!(TypeTag::Scalars.as_str(), "SCALARS");
/// assert_eq!(TypeTag::parse("SYMMETRIC_TENSORS"), Some(TypeTag::SymmetricTensors));
/// assert_eq!(TypeTag::parse("scalars"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// A scalar field.
    Scalars,
    /// A vector field.
    Vectors,
    /// A tensor field.
    Tensors,
    /// A symmetric tensor field.
    SymmetricTensors,
    /// A label field.
    Labels,
    /// A generic array payload (e.g. global node/zone id arrays).
    Arrays,
    /// A whole dataset.
    Dataset,
    /// A data-specification marker rather than data itself.
    DataSpecification,
}

impl TypeTag {
    /// All recognized tags, in declaration order.
    pub const ALL: [TypeTag; 8] = [
        TypeTag::Scalars,
        TypeTag::Vectors,
        TypeTag::Tensors,
        TypeTag::SymmetricTensors,
        TypeTag::Labels,
        TypeTag::Arrays,
        TypeTag::Dataset,
        TypeTag::DataSpecification,
    ];

    /// Returns the stable string form of this tag.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            TypeTag::Scalars => "SCALARS",
            TypeTag::Vectors => "VECTORS",
            TypeTag::Tensors => "TENSORS",
            TypeTag::SymmetricTensors => "SYMMETRIC_TENSORS",
            TypeTag::Labels => "LABELS",
            TypeTag::Arrays => "ARRAYS",
            TypeTag::Dataset => "DATASET",
            TypeTag::DataSpecification => "DATA_SPECIFICATION",
        }
    }

    /// Parses the stable string form back into a tag.
    ///
    /// Matching is exact and case-sensitive; anything else returns `None`.
    pub fn parse(s: &str) -> Option<TypeTag> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == s)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full five-part key under which a payload is cached.
///
/// Returned by the reverse-lookup operations
/// ([`VariableCache::get_renderable_key`](crate::VariableCache::get_renderable_key),
/// [`VariableCache::get_opaque_key`](crate::VariableCache::get_opaque_key))
/// to report a payload's provenance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// The variable name.
    pub variable: String,
    /// The payload discriminator.
    pub tag: TypeTag,
    /// Index into the dataset's time series.
    pub timestep: usize,
    /// Spatial partition id.
    pub domain: usize,
    /// Material partition, `None` when the variable is not partitioned by material.
    pub material: Option<String>,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, ts={}, dom={}, mat={})",
            self.variable,
            self.tag,
            self.timestep,
            self.domain,
            self.material.as_deref().unwrap_or("<none>")
        )
    }
}

/// Pointer-derived identity of a cached payload.
///
/// Two `ObjectId`s compare equal exactly when they were taken from the same
/// live allocation. An id is stable for as long as the payload it was taken
/// from is alive; ids taken from since-dropped payloads may collide with
/// later allocations, so callers must not hold ids past the payload lifetimes
/// they manage.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use varcache::{ObjectId, Renderable};
///
/// struct Mesh;
/// impl Renderable for Mesh {
///     fn as_any(&self) -> &dyn std::any::Any {
///         self
///     }
/// }
///
/// let a: Rc<dyn Renderable> = Rc::new(Mesh);
/// let b = Rc::clone(&a);
/// assert_eq!(ObjectId::of_renderable(&a), ObjectId::of_renderable(&b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Identity of a shared renderable handle.
    ///
    /// Clones of the same `Rc` yield the same id.
    #[inline]
    pub fn of_renderable(handle: &crate::item::RenderableHandle) -> ObjectId {
        ObjectId(Rc::as_ptr(handle) as *const () as usize)
    }

    /// Identity of a type-erased value, e.g. the view returned by
    /// [`VariableCache::get_opaque`](crate::VariableCache::get_opaque).
    #[inline]
    pub fn of_any(value: &dyn Any) -> ObjectId {
        ObjectId(value as *const dyn Any as *const () as usize)
    }

    /// The raw address this id was derived from, for diagnostics.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
