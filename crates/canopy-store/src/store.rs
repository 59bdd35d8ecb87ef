//! The [`ContentStore`] trait.

use async_trait::async_trait;
use canopy_model::{
    Entity, EntityKind, EntityPatch, EntityTree, Item, ItemPatch, NodeId, NodeKind, OrderScope,
    Section, SectionPatch, SectionTree,
};

use crate::error::StoreError;

/// Persistence contract for the content tree.
///
/// Single-row operations are atomic per row. The multi-row units (subtree
/// insert, cascade delete, position batch) are atomic as a whole: on failure
/// the store is left exactly as it was. Serializing mutations that touch the
/// same sibling group is the caller's job; the store only guarantees that
/// each call lands completely or not at all.
///
/// Lists are returned in position order, ascending.
#[async_trait]
pub trait ContentStore: Send + Sync {
    // --- Entities ---

    /// All entities of one kind, position order.
    async fn list_entities(&self, kind: EntityKind) -> Result<Vec<Entity>, StoreError>;

    /// Fetch one entity.
    async fn get_entity(&self, id: NodeId) -> Result<Entity, StoreError>;

    /// Insert a fully-populated entity row.
    ///
    /// Fails with a conflict if the route is already taken.
    async fn insert_entity(&self, entity: &Entity) -> Result<(), StoreError>;

    /// Apply a partial update and return the updated row.
    async fn update_entity(&self, id: NodeId, patch: &EntityPatch) -> Result<Entity, StoreError>;

    // --- Sections ---

    /// All sections of one entity, position order.
    async fn list_sections(&self, entity_id: NodeId) -> Result<Vec<Section>, StoreError>;

    /// Fetch one section.
    async fn get_section(&self, id: NodeId) -> Result<Section, StoreError>;

    /// Insert a fully-populated section row.
    async fn insert_section(&self, section: &Section) -> Result<(), StoreError>;

    /// Apply a partial update and return the updated row.
    async fn update_section(
        &self,
        id: NodeId,
        patch: &SectionPatch,
    ) -> Result<Section, StoreError>;

    // --- Items ---

    /// All items of one section, position order.
    async fn list_items(&self, section_id: NodeId) -> Result<Vec<Item>, StoreError>;

    /// Fetch one item.
    async fn get_item(&self, id: NodeId) -> Result<Item, StoreError>;

    /// Insert a fully-populated item row.
    async fn insert_item(&self, item: &Item) -> Result<(), StoreError>;

    /// Apply a partial update and return the updated row.
    async fn update_item(&self, id: NodeId, patch: &ItemPatch) -> Result<Item, StoreError>;

    // --- Flags and ordering ---

    /// Flip one node's visibility flag and return the new value.
    ///
    /// No effect on any other row: ancestor and descendant flags are
    /// independent by contract.
    async fn toggle_visibility(&self, node: NodeKind, id: NodeId) -> Result<bool, StoreError>;

    /// Persist a batch of `(id, position)` assignments for one sibling
    /// scope, atomically.
    async fn write_positions(
        &self,
        scope: OrderScope,
        assignments: &[(NodeId, i64)],
    ) -> Result<(), StoreError>;

    /// Whether any entity already claims `route`.
    async fn route_exists(&self, route: &str) -> Result<bool, StoreError>;

    // --- Atomic multi-row units ---

    /// Insert an entity with all of its sections and items, all-or-nothing.
    async fn insert_entity_tree(&self, tree: &EntityTree) -> Result<(), StoreError>;

    /// Insert a section with all of its items, all-or-nothing.
    async fn insert_section_tree(&self, tree: &SectionTree) -> Result<(), StoreError>;

    /// Delete an entity and every descendant, then close the position gap
    /// among the remaining entities of its kind, all in one unit.
    async fn delete_entity(&self, id: NodeId) -> Result<(), StoreError>;

    /// Delete a section and its items, then close the position gap among
    /// the entity's remaining sections, all in one unit.
    async fn delete_section(&self, id: NodeId) -> Result<(), StoreError>;

    /// Delete an item and close the position gap among the section's
    /// remaining items, in one unit.
    async fn delete_item(&self, id: NodeId) -> Result<(), StoreError>;
}
