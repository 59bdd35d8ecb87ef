//! Subtree cloning.
//!
//! Cloning is a pure tree transform: fresh identities throughout, child
//! references rewired to the new parents, content and per-node flags
//! preserved, internal positions preserved. Committing the clone atomically
//! is the engine's job; nothing here touches storage.

use canopy_model::{EntityTree, Item, NodeId, SectionTree};
use chrono::Utc;

/// Default display name for a copy.
#[must_use]
pub fn copy_name(source: &str) -> String {
    format!("{source} (Copy)")
}

/// Deep-copy an entity tree under fresh identities.
///
/// The copy takes `name`, `route`, and `position` (its slot at the end of
/// its sibling group); everything below the root is a faithful clone of the
/// source, sharing no identities with it.
#[must_use]
pub fn clone_entity_tree(
    source: &EntityTree,
    name: String,
    route: String,
    position: i64,
) -> EntityTree {
    let now = Utc::now();
    let root_id = NodeId::new();

    let mut entity = source.entity.clone();
    entity.id = root_id;
    entity.name = name;
    entity.route = route;
    entity.position = position;
    entity.created_at = now;
    entity.updated_at = now;

    let sections = source
        .sections
        .iter()
        .map(|section| clone_section_into(section, root_id, section.section.position))
        .collect();

    EntityTree { entity, sections }
}

/// Deep-copy a section tree under a (possibly different) entity.
///
/// `title` is the copy's title and `position` its slot in the target
/// entity's section list; item order and content are cloned as-is.
#[must_use]
pub fn clone_section_tree(
    source: &SectionTree,
    entity_id: NodeId,
    title: String,
    position: i64,
) -> SectionTree {
    let mut cloned = clone_section_into(source, entity_id, position);
    cloned.section.title = title;
    cloned
}

fn clone_section_into(source: &SectionTree, entity_id: NodeId, position: i64) -> SectionTree {
    let now = Utc::now();
    let section_id = NodeId::new();

    let mut section = source.section.clone();
    section.id = section_id;
    section.entity_id = entity_id;
    section.position = position;
    section.created_at = now;
    section.updated_at = now;

    let items = source
        .items
        .iter()
        .map(|item| {
            let mut item: Item = item.clone();
            item.id = NodeId::new();
            item.section_id = section_id;
            item.created_at = now;
            item.updated_at = now;
            item
        })
        .collect();

    SectionTree { section, items }
}
