//! Nested read views.
//!
//! [`EntityTree`] is the shape both read paths consume: the admin editor
//! (all nodes, flags intact) and the public rendering layer (hidden nodes
//! pruned). The tree serializes with the entity fields inlined at the root,
//! which is what the frontend expects.

use serde::Serialize;

use crate::node::{Entity, Item, Section};

/// An entity with its sections and their items, sorted by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTree {
    /// The root entity.
    #[serde(flatten)]
    pub entity: Entity,
    /// Sections in position order.
    pub sections: Vec<SectionTree>,
}

/// A section with its items, sorted by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionTree {
    /// The section record.
    #[serde(flatten)]
    pub section: Section,
    /// Items in position order.
    pub items: Vec<Item>,
}

impl EntityTree {
    /// Number of sections.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Total number of items across all sections.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// Total number of nodes, the root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.section_count() + self.item_count()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::id::NodeId;
    use crate::kind::EntityKind;

    fn entity() -> Entity {
        Entity {
            id: NodeId::new(),
            kind: EntityKind::Solutions,
            name: "Retail".to_owned(),
            description: "Experiences built for the future of retail".to_owned(),
            category: "Industry".to_owned(),
            route: "/solutions/retail".to_owned(),
            is_visible: true,
            position: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn section(entity_id: NodeId, position: i64) -> Section {
        Section {
            id: NodeId::new(),
            entity_id,
            section_type: "features".to_owned(),
            title: "Key features".to_owned(),
            body: String::new(),
            is_visible: true,
            position,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(section_id: NodeId, position: i64) -> Item {
        Item {
            id: NodeId::new(),
            section_id,
            item_type: "feature_card".to_owned(),
            title: "Elastic scale".to_owned(),
            description: String::new(),
            payload: None,
            is_visible: true,
            position,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_counts() {
        let root = entity();
        let s0 = section(root.id, 0);
        let s1 = section(root.id, 1);
        let tree = EntityTree {
            sections: vec![
                SectionTree {
                    items: vec![item(s0.id, 0), item(s0.id, 1)],
                    section: s0,
                },
                SectionTree {
                    items: vec![],
                    section: s1,
                },
            ],
            entity: root,
        };

        assert_eq!(tree.section_count(), 2);
        assert_eq!(tree.item_count(), 2);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_tree_serializes_flattened() {
        let root = entity();
        let s0 = section(root.id, 0);
        let tree = EntityTree {
            sections: vec![SectionTree {
                items: vec![],
                section: s0,
            }],
            entity: root,
        };

        let json = serde_json::to_value(&tree).unwrap();

        // Entity fields inlined at the root, sections nested.
        assert_eq!(json["route"], "/solutions/retail");
        assert_eq!(json["sections"][0]["sectionType"], "features");
        assert_eq!(json["sections"][0]["items"], serde_json::json!([]));
    }
}
