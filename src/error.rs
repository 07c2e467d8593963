//! Error types for the varcache library.
//!
//! Absence of a cached entry is never an error in this crate: every `get_*` and
//! `find_*` operation returns [`Option`], because a cache miss is the normal,
//! frequent outcome. [`CacheError`] covers only caller contract violations,
//! which are raised immediately and are never retried.

extern crate alloc;

use crate::item::ItemKind;
use alloc::string::String;
use core::fmt;

/// Error returned when a caching operation violates the cache's contract.
///
/// Produced by the fallible insertion paths on
/// [`VariableCache`](crate::VariableCache). Both variants indicate a caller
/// bug rather than a transient condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A key component was malformed, e.g. an empty variable name.
    InvalidArgument(String),

    /// A replacement would change the payload kind of an occupied slot.
    ///
    /// A slot holding a renderable handle can only be replaced by another
    /// renderable handle, and likewise for opaque payloads.
    TypeMismatch {
        /// The kind already stored in the slot.
        expected: ItemKind,
        /// The kind the caller attempted to store.
        found: ItemKind,
    },
}

impl CacheError {
    /// Creates an [`CacheError::InvalidArgument`] with the given description.
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::TypeMismatch { expected, found } => write!(
                f,
                "payload kind mismatch: slot holds {expected}, caller supplied {found}"
            ),
        }
    }
}

impl core::error::Error for CacheError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_invalid_argument_display() {
        let err = CacheError::invalid_argument("variable name must not be empty");
        assert!(err.to_string().contains("variable name"));
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = CacheError::TypeMismatch {
            expected: ItemKind::Renderable,
            found: ItemKind::Opaque,
        };
        let msg = err.to_string();
        assert!(msg.contains("renderable"));
        assert!(msg.contains("opaque"));
    }

    #[test]
    fn test_errors_are_comparable() {
        assert_eq!(
            CacheError::invalid_argument("x"),
            CacheError::InvalidArgument("x".to_string())
        );
        assert_ne!(
            CacheError::invalid_argument("x"),
            CacheError::TypeMismatch {
                expected: ItemKind::Opaque,
                found: ItemKind::Renderable,
            }
        );
    }
}
