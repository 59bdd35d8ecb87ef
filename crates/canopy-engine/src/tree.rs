//! Nested tree assembly and pruning.

use canopy_model::{EntityTree, NodeId, SectionTree};
use canopy_store::ContentStore;

use crate::error::EngineError;

/// Which read view to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeView {
    /// Admin editing: every node, visibility flags intact.
    Admin,
    /// Public rendering: nodes whose own flag is false are pruned together
    /// with their entire subtree.
    Public,
}

impl TreeView {
    /// Whether hidden nodes are included.
    #[must_use]
    pub fn includes_hidden(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Assemble the nested tree for an entity.
///
/// Sections and items arrive from the store in position order. For the
/// public view a hidden root yields `NotFound`: pruning applies to the root
/// like any other node, and a fully pruned tree has nothing to serve.
pub(crate) async fn fetch(
    store: &dyn ContentStore,
    entity_id: NodeId,
    view: TreeView,
) -> Result<EntityTree, EngineError> {
    let entity = store.get_entity(entity_id).await?;
    if view == TreeView::Public && !entity.is_visible {
        return Err(EngineError::NotFound {
            node: canopy_model::NodeKind::Entity,
            id: entity_id,
        });
    }

    let mut sections = Vec::new();
    for section in store.list_sections(entity_id).await? {
        let items = store.list_items(section.id).await?;
        sections.push(SectionTree { section, items });
    }

    let tree = EntityTree { entity, sections };
    Ok(match view {
        TreeView::Admin => tree,
        TreeView::Public => prune(tree),
    })
}

/// Drop every hidden section (with all of its items) and every hidden item.
///
/// A node's own flag decides; descendant flags are not consulted, so a
/// visible item under a hidden section disappears with its parent.
#[must_use]
pub fn prune(mut tree: EntityTree) -> EntityTree {
    tree.sections.retain(|s| s.section.is_visible);
    for section in &mut tree.sections {
        section.items.retain(|i| i.is_visible);
    }
    tree
}
