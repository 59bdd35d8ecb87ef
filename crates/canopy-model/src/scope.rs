//! Sibling-group scopes.

use std::fmt;

use crate::id::NodeId;
use crate::kind::EntityKind;

/// Names one sibling group whose ordering must stay contiguous.
///
/// All mutations that can disturb the ordering of a scope (insert, remove,
/// move, duplicate, cascade delete) are serialized per scope by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderScope {
    /// All entities of one kind.
    Entities(EntityKind),
    /// All sections of one entity.
    Sections(NodeId),
    /// All items of one section.
    Items(NodeId),
}

impl fmt::Display for OrderScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entities(kind) => write!(f, "entities:{kind}"),
            Self::Sections(id) => write!(f, "sections:{id}"),
            Self::Items(id) => write!(f, "items:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        let id = NodeId::new();

        assert_eq!(
            OrderScope::Entities(EntityKind::Products).to_string(),
            "entities:products"
        );
        assert_eq!(
            OrderScope::Sections(id).to_string(),
            format!("sections:{id}")
        );
    }

    #[test]
    fn test_scope_equality_is_per_parent() {
        let a = NodeId::new();
        let b = NodeId::new();

        assert_eq!(OrderScope::Items(a), OrderScope::Items(a));
        assert_ne!(OrderScope::Items(a), OrderScope::Items(b));
        assert_ne!(OrderScope::Sections(a), OrderScope::Items(a));
    }
}
