//! Engine error type.

use canopy_model::{NodeId, NodeKind};
use canopy_store::{StoreError, StoreErrorKind};

/// Error returned by [`ContentEngine`](crate::ContentEngine) operations.
///
/// Every variant maps to one stable machine-readable code ([`Self::code`]),
/// which is what API callers dispatch on. Mutations that fail leave no
/// partial state, so any failed call may be retried as-is.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A required field is missing or malformed, or a type tag is unknown.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced node does not exist (or is outside the addressed scope).
    #[error("{node} not found: {id}")]
    NotFound {
        /// Node level that failed to resolve.
        node: NodeKind,
        /// The identity that failed to resolve.
        id: NodeId,
    },

    /// A uniqueness rule was violated (duplicate route).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A subtree clone could not be committed; the store was rolled back.
    #[error("Duplication failed: {0}")]
    DuplicationFailed(#[source] StoreError),

    /// A subtree deletion could not be committed; the store was rolled back.
    #[error("Cascade deletion failed: {0}")]
    CascadeFailed(#[source] StoreError),

    /// Any other storage failure.
    #[error("Storage error: {0}")]
    Store(#[source] StoreError),
}

impl EngineError {
    /// Stable machine-readable code for API callers.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::DuplicationFailed(_) => "duplication_failed",
            Self::CascadeFailed(_) => "cascade_failed",
            Self::Store(_) => "internal",
        }
    }

    /// Wrap a store failure that happened while committing a duplication.
    ///
    /// Not-found and conflict keep their category; everything else becomes
    /// [`Self::DuplicationFailed`].
    pub(crate) fn duplication(err: StoreError) -> Self {
        match err.kind {
            StoreErrorKind::NotFound | StoreErrorKind::Conflict => Self::from(err),
            _ => Self::DuplicationFailed(err),
        }
    }

    /// Wrap a store failure that happened while committing a cascade delete.
    pub(crate) fn cascade(err: StoreError) -> Self {
        match err.kind {
            StoreErrorKind::NotFound | StoreErrorKind::Conflict => Self::from(err),
            _ => Self::CascadeFailed(err),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match (err.kind, err.node, err.id) {
            (StoreErrorKind::NotFound, Some(node), Some(id)) => Self::NotFound { node, id },
            (StoreErrorKind::Conflict, ..) => Self::Conflict(err.to_string()),
            _ => Self::Store(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let id = NodeId::new();
        let errors = [
            EngineError::Validation("missing name".to_owned()),
            EngineError::NotFound {
                node: NodeKind::Entity,
                id,
            },
            EngineError::Conflict("route taken".to_owned()),
            EngineError::DuplicationFailed(StoreError::new(StoreErrorKind::Unavailable)),
            EngineError::CascadeFailed(StoreError::new(StoreErrorKind::Unavailable)),
            EngineError::Store(StoreError::new(StoreErrorKind::Other)),
        ];

        let codes: std::collections::HashSet<_> = errors.iter().map(EngineError::code).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_store_not_found_maps_with_context() {
        let id = NodeId::new();
        let err = EngineError::from(StoreError::not_found(NodeKind::Item, id));

        assert!(matches!(
            err,
            EngineError::NotFound {
                node: NodeKind::Item,
                id: got,
            } if got == id
        ));
    }

    #[test]
    fn test_duplication_wrap_keeps_conflict() {
        let err = EngineError::duplication(StoreError::conflict("route / already exists"));

        assert_eq!(err.code(), "conflict");
    }

    #[test]
    fn test_duplication_wrap_marks_other_failures() {
        let err = EngineError::duplication(StoreError::new(StoreErrorKind::Unavailable));

        assert_eq!(err.code(), "duplication_failed");
    }
}
