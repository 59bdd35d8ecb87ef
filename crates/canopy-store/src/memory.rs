//! In-memory storage backend for testing.
//!
//! Provides [`MemoryStore`] for unit testing without a database file. Beyond
//! plain CRUD it supports write fault injection: [`MemoryStore::fail_after_writes`]
//! arms a countdown after which every row write fails, which is how the
//! engine's rollback guarantees are exercised. Multi-row units stage their
//! writes and apply them only when every staged row succeeded, mirroring the
//! transactional behavior of the SQLite backend.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use canopy_model::{
    Entity, EntityKind, EntityPatch, EntityTree, Item, ItemPatch, NodeId, NodeKind, OrderScope,
    Section, SectionPatch, SectionTree,
};
use chrono::Utc;

use crate::error::{StoreError, StoreErrorKind};
use crate::store::ContentStore;

#[derive(Debug, Default, Clone)]
struct Tables {
    entities: HashMap<NodeId, Entity>,
    sections: HashMap<NodeId, Section>,
    items: HashMap<NodeId, Item>,
}

impl Tables {
    fn route_taken(&self, route: &str) -> bool {
        self.entities.values().any(|e| e.route == route)
    }
}

/// In-memory [`ContentStore`] for testing.
///
/// # Example
///
/// ```ignore
/// use canopy_store::{ContentStore, MemoryStore};
///
/// let store = MemoryStore::new()
///     .with_entity(entity)
///     .with_section(section);
///
/// store.fail_after_writes(2); // third row write onward fails
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
    /// Row writes left before injected failure. `i64::MAX` means no fault.
    writes_left: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Tables::default()),
            writes_left: AtomicI64::new(i64::MAX),
        }
    }
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entity row (bypasses fault injection).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_entity(self, entity: Entity) -> Self {
        self.inner.write().unwrap().entities.insert(entity.id, entity);
        self
    }

    /// Seed a section row (bypasses fault injection).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_section(self, section: Section) -> Self {
        self.inner.write().unwrap().sections.insert(section.id, section);
        self
    }

    /// Seed an item row (bypasses fault injection).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_item(self, item: Item) -> Self {
        self.inner.write().unwrap().items.insert(item.id, item);
        self
    }

    /// Let the next `n` row writes succeed, then fail every one after.
    pub fn fail_after_writes(&self, n: i64) {
        self.writes_left.store(n, Ordering::SeqCst);
    }

    /// Disarm fault injection.
    pub fn heal(&self) {
        self.writes_left.store(i64::MAX, Ordering::SeqCst);
    }

    /// Number of rows currently stored, all levels combined.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn row_count(&self) -> usize {
        let tables = self.inner.read().unwrap();
        tables.entities.len() + tables.sections.len() + tables.items.len()
    }

    fn consume_write(&self) -> Result<(), StoreError> {
        if self.writes_left.fetch_sub(1, Ordering::SeqCst) <= 0 {
            return Err(StoreError::new(StoreErrorKind::Unavailable)
                .with_backend("Memory")
                .with_detail("injected write fault"));
        }
        Ok(())
    }
}

fn sorted_by_position<T>(mut rows: Vec<T>, position: impl Fn(&T) -> i64) -> Vec<T> {
    rows.sort_by_key(|r| position(r));
    rows
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_entities(&self, kind: EntityKind) -> Result<Vec<Entity>, StoreError> {
        let tables = self.inner.read().unwrap();
        let rows = tables
            .entities
            .values()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect();
        Ok(sorted_by_position(rows, |e: &Entity| e.position))
    }

    async fn get_entity(&self, id: NodeId) -> Result<Entity, StoreError> {
        self.inner
            .read()
            .unwrap()
            .entities
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(NodeKind::Entity, id).with_backend("Memory"))
    }

    async fn insert_entity(&self, entity: &Entity) -> Result<(), StoreError> {
        self.consume_write()?;
        let mut tables = self.inner.write().unwrap();
        if tables.route_taken(&entity.route) {
            return Err(StoreError::conflict(format!("route {} already exists", entity.route))
                .with_backend("Memory"));
        }
        tables.entities.insert(entity.id, entity.clone());
        Ok(())
    }

    async fn update_entity(&self, id: NodeId, patch: &EntityPatch) -> Result<Entity, StoreError> {
        self.consume_write()?;
        let mut tables = self.inner.write().unwrap();
        if let Some(route) = &patch.route
            && tables.entities.get(&id).is_some_and(|e| &e.route != route)
            && tables.route_taken(route)
        {
            return Err(
                StoreError::conflict(format!("route {route} already exists")).with_backend("Memory")
            );
        }
        let entity = tables
            .entities
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(NodeKind::Entity, id).with_backend("Memory"))?;
        if let Some(name) = &patch.name {
            entity.name.clone_from(name);
        }
        if let Some(description) = &patch.description {
            entity.description.clone_from(description);
        }
        if let Some(category) = &patch.category {
            entity.category.clone_from(category);
        }
        if let Some(route) = &patch.route {
            entity.route.clone_from(route);
        }
        entity.updated_at = Utc::now();
        Ok(entity.clone())
    }

    async fn list_sections(&self, entity_id: NodeId) -> Result<Vec<Section>, StoreError> {
        let tables = self.inner.read().unwrap();
        let rows = tables
            .sections
            .values()
            .filter(|s| s.entity_id == entity_id)
            .cloned()
            .collect();
        Ok(sorted_by_position(rows, |s: &Section| s.position))
    }

    async fn get_section(&self, id: NodeId) -> Result<Section, StoreError> {
        self.inner
            .read()
            .unwrap()
            .sections
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(NodeKind::Section, id).with_backend("Memory"))
    }

    async fn insert_section(&self, section: &Section) -> Result<(), StoreError> {
        self.consume_write()?;
        let mut tables = self.inner.write().unwrap();
        tables.sections.insert(section.id, section.clone());
        Ok(())
    }

    async fn update_section(
        &self,
        id: NodeId,
        patch: &SectionPatch,
    ) -> Result<Section, StoreError> {
        self.consume_write()?;
        let mut tables = self.inner.write().unwrap();
        let section = tables
            .sections
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(NodeKind::Section, id).with_backend("Memory"))?;
        if let Some(section_type) = &patch.section_type {
            section.section_type.clone_from(section_type);
        }
        if let Some(title) = &patch.title {
            section.title.clone_from(title);
        }
        if let Some(body) = &patch.body {
            section.body.clone_from(body);
        }
        section.updated_at = Utc::now();
        Ok(section.clone())
    }

    async fn list_items(&self, section_id: NodeId) -> Result<Vec<Item>, StoreError> {
        let tables = self.inner.read().unwrap();
        let rows = tables
            .items
            .values()
            .filter(|i| i.section_id == section_id)
            .cloned()
            .collect();
        Ok(sorted_by_position(rows, |i: &Item| i.position))
    }

    async fn get_item(&self, id: NodeId) -> Result<Item, StoreError> {
        self.inner
            .read()
            .unwrap()
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(NodeKind::Item, id).with_backend("Memory"))
    }

    async fn insert_item(&self, item: &Item) -> Result<(), StoreError> {
        self.consume_write()?;
        let mut tables = self.inner.write().unwrap();
        tables.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn update_item(&self, id: NodeId, patch: &ItemPatch) -> Result<Item, StoreError> {
        self.consume_write()?;
        let mut tables = self.inner.write().unwrap();
        let item = tables
            .items
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(NodeKind::Item, id).with_backend("Memory"))?;
        if let Some(item_type) = &patch.item_type {
            item.item_type.clone_from(item_type);
        }
        if let Some(title) = &patch.title {
            item.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            item.description.clone_from(description);
        }
        if let Some(payload) = &patch.payload {
            item.payload = if payload.is_null() {
                None
            } else {
                Some(payload.clone())
            };
        }
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn toggle_visibility(&self, node: NodeKind, id: NodeId) -> Result<bool, StoreError> {
        self.consume_write()?;
        let mut tables = self.inner.write().unwrap();
        let flag = match node {
            NodeKind::Entity => tables.entities.get_mut(&id).map(|e| {
                e.is_visible = !e.is_visible;
                e.is_visible
            }),
            NodeKind::Section => tables.sections.get_mut(&id).map(|s| {
                s.is_visible = !s.is_visible;
                s.is_visible
            }),
            NodeKind::Item => tables.items.get_mut(&id).map(|i| {
                i.is_visible = !i.is_visible;
                i.is_visible
            }),
        };
        flag.ok_or_else(|| StoreError::not_found(node, id).with_backend("Memory"))
    }

    async fn write_positions(
        &self,
        scope: OrderScope,
        assignments: &[(NodeId, i64)],
    ) -> Result<(), StoreError> {
        // Stage on a copy so a mid-batch fault leaves nothing applied.
        let mut staged = self.inner.read().unwrap().clone();
        for (id, position) in assignments {
            self.consume_write()?;
            let updated = match scope {
                OrderScope::Entities(_) => staged
                    .entities
                    .get_mut(id)
                    .map(|e| e.position = *position)
                    .is_some(),
                OrderScope::Sections(_) => staged
                    .sections
                    .get_mut(id)
                    .map(|s| s.position = *position)
                    .is_some(),
                OrderScope::Items(_) => staged
                    .items
                    .get_mut(id)
                    .map(|i| i.position = *position)
                    .is_some(),
            };
            if !updated {
                let node = match scope {
                    OrderScope::Entities(_) => NodeKind::Entity,
                    OrderScope::Sections(_) => NodeKind::Section,
                    OrderScope::Items(_) => NodeKind::Item,
                };
                return Err(StoreError::not_found(node, *id).with_backend("Memory"));
            }
        }
        *self.inner.write().unwrap() = staged;
        Ok(())
    }

    async fn route_exists(&self, route: &str) -> Result<bool, StoreError> {
        Ok(self.inner.read().unwrap().route_taken(route))
    }

    async fn insert_entity_tree(&self, tree: &EntityTree) -> Result<(), StoreError> {
        let mut staged = self.inner.read().unwrap().clone();
        if staged.route_taken(&tree.entity.route) {
            return Err(StoreError::conflict(format!(
                "route {} already exists",
                tree.entity.route
            ))
            .with_backend("Memory"));
        }
        self.consume_write()?;
        staged.entities.insert(tree.entity.id, tree.entity.clone());
        for section in &tree.sections {
            self.consume_write()?;
            staged.sections.insert(section.section.id, section.section.clone());
            for item in &section.items {
                self.consume_write()?;
                staged.items.insert(item.id, item.clone());
            }
        }
        *self.inner.write().unwrap() = staged;
        Ok(())
    }

    async fn insert_section_tree(&self, tree: &SectionTree) -> Result<(), StoreError> {
        let mut staged = self.inner.read().unwrap().clone();
        self.consume_write()?;
        staged.sections.insert(tree.section.id, tree.section.clone());
        for item in &tree.items {
            self.consume_write()?;
            staged.items.insert(item.id, item.clone());
        }
        *self.inner.write().unwrap() = staged;
        Ok(())
    }

    async fn delete_entity(&self, id: NodeId) -> Result<(), StoreError> {
        self.consume_write()?;
        let mut staged = self.inner.read().unwrap().clone();
        let entity = staged
            .entities
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(NodeKind::Entity, id).with_backend("Memory"))?;

        let section_ids: Vec<NodeId> = staged
            .sections
            .values()
            .filter(|s| s.entity_id == id)
            .map(|s| s.id)
            .collect();
        staged.sections.retain(|_, s| s.entity_id != id);
        staged.items.retain(|_, i| !section_ids.contains(&i.section_id));
        for sibling in staged.entities.values_mut() {
            if sibling.kind == entity.kind && sibling.position > entity.position {
                sibling.position -= 1;
            }
        }
        *self.inner.write().unwrap() = staged;
        Ok(())
    }

    async fn delete_section(&self, id: NodeId) -> Result<(), StoreError> {
        self.consume_write()?;
        let mut staged = self.inner.read().unwrap().clone();
        let section = staged
            .sections
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(NodeKind::Section, id).with_backend("Memory"))?;

        staged.items.retain(|_, i| i.section_id != id);
        for sibling in staged.sections.values_mut() {
            if sibling.entity_id == section.entity_id && sibling.position > section.position {
                sibling.position -= 1;
            }
        }
        *self.inner.write().unwrap() = staged;
        Ok(())
    }

    async fn delete_item(&self, id: NodeId) -> Result<(), StoreError> {
        self.consume_write()?;
        let mut staged = self.inner.read().unwrap().clone();
        let item = staged
            .items
            .remove(&id)
            .ok_or_else(|| StoreError::not_found(NodeKind::Item, id).with_backend("Memory"))?;

        for sibling in staged.items.values_mut() {
            if sibling.section_id == item.section_id && sibling.position > item.position {
                sibling.position -= 1;
            }
        }
        *self.inner.write().unwrap() = staged;
        Ok(())
    }
}
