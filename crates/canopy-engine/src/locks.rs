//! Per-scope write serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use canopy_model::OrderScope;

/// Registry of one async mutex per sibling-group scope.
///
/// Lock handles are created lazily and never evicted; the number of scopes
/// is bounded by the number of parents the admin actually edits within one
/// process lifetime.
#[derive(Debug, Default)]
pub(crate) struct ScopeLocks {
    inner: Mutex<HashMap<OrderScope, Arc<tokio::sync::Mutex<()>>>>,
}

impl ScopeLocks {
    /// The lock handle for `scope`.
    ///
    /// # Panics
    ///
    /// Panics if the registry mutex is poisoned.
    pub(crate) fn get(&self, scope: OrderScope) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap();
        Arc::clone(map.entry(scope).or_default())
    }
}

#[cfg(test)]
mod tests {
    use canopy_model::{EntityKind, NodeId};

    use super::*;

    #[test]
    fn test_same_scope_shares_one_lock() {
        let locks = ScopeLocks::default();
        let id = NodeId::new();

        let a = locks.get(OrderScope::Sections(id));
        let b = locks.get(OrderScope::Sections(id));

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_different_scopes_get_different_locks() {
        let locks = ScopeLocks::default();

        let a = locks.get(OrderScope::Entities(EntityKind::Products));
        let b = locks.get(OrderScope::Entities(EntityKind::Solutions));

        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_lock_serializes_critical_section() {
        let locks = ScopeLocks::default();
        let scope = OrderScope::Items(NodeId::new());

        let handle = locks.get(scope);
        let guard = handle.lock().await;

        // A second writer on the same scope must not get the lock.
        let second = locks.get(scope);
        assert!(second.try_lock().is_err());

        drop(guard);
        assert!(second.try_lock().is_ok());
    }
}
