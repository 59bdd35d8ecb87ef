//! Node identities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a tree node (entity, section, or item).
///
/// Backed by a UUIDv4, so identities are globally unique and never reused
/// after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Allocate a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identity from its hyphenated string form.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`uuid::Error`] if `s` is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The three node levels of the content tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Top-level content owner.
    Entity,
    /// Named content block under an entity.
    Section,
    /// Leaf record under a section.
    Item,
}

impl NodeKind {
    /// Lowercase name, used in error messages and log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Section => "section",
            Self::Item => "item",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_round_trip() {
        let id = NodeId::new();
        let parsed = NodeId::parse(&id.to_string()).unwrap();

        assert_eq!(id, parsed);
    }

    #[test]
    fn test_node_id_unique() {
        assert_ne!(NodeId::new(), NodeId::new());
    }

    #[test]
    fn test_node_id_parse_invalid() {
        assert!(NodeId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_node_id_serde_transparent() {
        let id = NodeId::new();
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn test_node_kind_names() {
        assert_eq!(NodeKind::Entity.as_str(), "entity");
        assert_eq!(NodeKind::Section.as_str(), "section");
        assert_eq!(NodeKind::Item.as_str(), "item");
    }
}
