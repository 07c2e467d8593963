//! Cached payload types.
//!
//! A cache slot holds exactly one of two payload kinds:
//!
//! - [`RenderableHandle`]: a shared, reference-counted handle to a renderable
//!   object (a mesh, a field array, a dataset). The cache is one non-exclusive
//!   holder: storing a handle clones the `Rc` (refcount increment), evicting
//!   it drops the clone (decrement). The underlying object is freed by
//!   whichever holder drops last, possibly not the cache.
//! - [`OpaquePayload`]: a type-erased auxiliary value owned outright by the
//!   cache and dropped exactly once on eviction. Teardown is the boxed
//!   value's `Drop`; a payload needing custom cleanup wraps its value in a
//!   guard type whose `Drop` performs it.
//!
//! The two kinds never mix under one key: replacing a slot's payload with the
//! other kind is a caller bug, surfaced as
//! [`CacheError::TypeMismatch`](crate::CacheError::TypeMismatch).

extern crate alloc;

use crate::key::ObjectId;
use alloc::boxed::Box;
use alloc::rc::Rc;
use core::any::Any;
use core::fmt;

/// A renderable object the cache can hold a shared handle to.
///
/// Implementors provide downcasting access via [`Renderable::as_any`] and may
/// override [`Renderable::estimated_size`] with a structural estimate (element
/// counts times array byte-widths) used by
/// [`VariableCache::estimate_total_size`](crate::VariableCache::estimate_total_size).
///
/// # Examples
///
/// ```
/// use varcache::Renderable;
///
/// struct PointMesh {
///     coords: Vec<[f32; 3]>,
/// }
///
/// impl Renderable for PointMesh {
///     fn as_any(&self) -> &dyn std::any::Any {
///         self
///     }
///
///     fn estimated_size(&self) -> u64 {
///         (self.coords.len() * std::mem::size_of::<[f32; 3]>()) as u64
///     }
/// }
/// ```
pub trait Renderable: 'static {
    /// Access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Structural byte-size estimate of the object, for diagnostics.
    ///
    /// Defaults to 0; estimates never drive eviction.
    fn estimated_size(&self) -> u64 {
        0
    }
}

/// Shared handle to an externally reference-counted renderable object.
pub type RenderableHandle = Rc<dyn Renderable>;

/// A type-erased auxiliary payload owned outright by the cache.
///
/// Dropped exactly once when its slot is replaced or cleared. The optional
/// size hint feeds
/// [`VariableCache::estimate_total_size`](crate::VariableCache::estimate_total_size);
/// it defaults to 0 and has no behavioral effect.
pub struct OpaquePayload {
    value: Box<dyn Any>,
    size: u64,
}

impl OpaquePayload {
    /// Wraps a value with no size hint.
    #[inline]
    pub fn new(value: impl Any) -> Self {
        Self::with_size(value, 0)
    }

    /// Wraps a value with a caller-supplied byte-size hint.
    #[inline]
    pub fn with_size(value: impl Any, size: u64) -> Self {
        Self {
            value: Box::new(value),
            size,
        }
    }

    /// A borrowed view of the erased value.
    #[inline]
    pub fn value(&self) -> &dyn Any {
        &*self.value
    }

    /// The caller-supplied size hint.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Identity of the erased value, stable while the payload is alive.
    #[inline]
    pub fn id(&self) -> ObjectId {
        ObjectId::of_any(&*self.value)
    }
}

impl fmt::Debug for OpaquePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaquePayload")
            .field("id", &self.id())
            .field("size", &self.size)
            .finish()
    }
}

/// The payload kind stored in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// A shared renderable handle.
    Renderable,
    /// An owned opaque payload.
    Opaque,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Renderable => f.write_str("renderable"),
            ItemKind::Opaque => f.write_str("opaque"),
        }
    }
}

/// One cached payload: either payload kind, tagged.
pub enum CachedItem {
    /// A shared renderable handle.
    Renderable(RenderableHandle),
    /// An owned opaque payload.
    Opaque(OpaquePayload),
}

impl CachedItem {
    /// The kind of this payload.
    #[inline]
    pub fn kind(&self) -> ItemKind {
        match self {
            CachedItem::Renderable(_) => ItemKind::Renderable,
            CachedItem::Opaque(_) => ItemKind::Opaque,
        }
    }

    /// Identity of the underlying object, for reverse lookup.
    #[inline]
    pub fn id(&self) -> ObjectId {
        match self {
            CachedItem::Renderable(handle) => ObjectId::of_renderable(handle),
            CachedItem::Opaque(payload) => payload.id(),
        }
    }

    /// Byte-size estimate of the underlying object.
    #[inline]
    pub fn estimated_size(&self) -> u64 {
        match self {
            CachedItem::Renderable(handle) => handle.estimated_size(),
            CachedItem::Opaque(payload) => payload.size(),
        }
    }

    /// The renderable handle, if this is a renderable item.
    #[inline]
    pub fn as_renderable(&self) -> Option<&RenderableHandle> {
        match self {
            CachedItem::Renderable(handle) => Some(handle),
            CachedItem::Opaque(_) => None,
        }
    }

    /// The opaque payload, if this is an opaque item.
    #[inline]
    pub fn as_opaque(&self) -> Option<&OpaquePayload> {
        match self {
            CachedItem::Renderable(_) => None,
            CachedItem::Opaque(payload) => Some(payload),
        }
    }
}

impl fmt::Debug for CachedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedItem")
            .field("kind", &self.kind())
            .field("id", &self.id())
            .field("estimated_size", &self.estimated_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    struct TestMesh {
        points: Vec<f64>,
    }

    impl Renderable for TestMesh {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn estimated_size(&self) -> u64 {
            (self.points.len() * core::mem::size_of::<f64>()) as u64
        }
    }

    #[test]
    fn test_renderable_handle_is_shared() {
        let handle: RenderableHandle = Rc::new(TestMesh {
            points: vec![0.0; 8],
        });
        assert_eq!(Rc::strong_count(&handle), 1);
        let item = CachedItem::Renderable(Rc::clone(&handle));
        assert_eq!(Rc::strong_count(&handle), 2);
        drop(item);
        assert_eq!(Rc::strong_count(&handle), 1);
    }

    #[test]
    fn test_renderable_size_estimate() {
        let handle: RenderableHandle = Rc::new(TestMesh {
            points: vec![0.0; 100],
        });
        let item = CachedItem::Renderable(handle);
        assert_eq!(item.estimated_size(), 800);
        assert_eq!(item.kind(), ItemKind::Renderable);
    }

    #[test]
    fn test_renderable_downcast() {
        let handle: RenderableHandle = Rc::new(TestMesh {
            points: vec![1.0, 2.0],
        });
        let mesh = handle.as_any().downcast_ref::<TestMesh>().unwrap();
        assert_eq!(mesh.points.len(), 2);
    }

    #[test]
    fn test_opaque_payload_view_and_size() {
        let payload = OpaquePayload::with_size(vec![1u32, 2, 3], 12);
        assert_eq!(payload.size(), 12);
        let values = payload.value().downcast_ref::<Vec<u32>>().unwrap();
        assert_eq!(values, &vec![1, 2, 3]);
    }

    #[test]
    fn test_opaque_payload_default_size_is_zero() {
        let payload = OpaquePayload::new(7u8);
        assert_eq!(payload.size(), 0);
        assert_eq!(CachedItem::Opaque(payload).estimated_size(), 0);
    }

    #[test]
    fn test_opaque_id_matches_view() {
        let payload = OpaquePayload::new(42u64);
        let id = payload.id();
        assert_eq!(ObjectId::of_any(payload.value()), id);
    }

    #[test]
    fn test_item_ids_differ_per_allocation() {
        let a = CachedItem::Opaque(OpaquePayload::new(1u32));
        let b = CachedItem::Opaque(OpaquePayload::new(1u32));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_drop_runs_payload_destructor() {
        use core::cell::Cell;

        struct Guard {
            drops: Rc<Cell<usize>>,
        }

        impl Drop for Guard {
            fn drop(&mut self) {
                self.drops.set(self.drops.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        let item = CachedItem::Opaque(OpaquePayload::new(Guard {
            drops: Rc::clone(&drops),
        }));
        assert_eq!(drops.get(), 0);
        drop(item);
        assert_eq!(drops.get(), 1);
    }
}
