//! The [`ContentEngine`].

use std::sync::Arc;

use canopy_model::{
    DuplicateOverrides, Entity, EntityDraft, EntityKind, EntityPatch, EntityTree, Item, ItemDraft,
    ItemPatch, NodeId, NodeKind, OrderScope, Section, SectionDraft, SectionPatch, SectionTree,
};
use canopy_store::ContentStore;
use chrono::Utc;

use crate::duplicate;
use crate::error::EngineError;
use crate::locks::ScopeLocks;
use crate::order;
use crate::tree::{self, TreeView};

/// The content-tree engine.
///
/// One instance serves every content kind; all operations address nodes by
/// their full parent chain (`kind` / entity / section / item), and a node
/// outside the addressed chain resolves as not found. Mutations that can
/// disturb a sibling group's ordering hold that group's lock for their whole
/// duration.
pub struct ContentEngine {
    store: Arc<dyn ContentStore>,
    locks: ScopeLocks,
}

impl ContentEngine {
    /// Create an engine over a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            locks: ScopeLocks::default(),
        }
    }

    // --- resolution ---

    /// Fetch an entity, requiring it to be of `kind`.
    async fn resolve_entity(&self, kind: EntityKind, id: NodeId) -> Result<Entity, EngineError> {
        let entity = self.store.get_entity(id).await?;
        if entity.kind == kind {
            Ok(entity)
        } else {
            // Addressed under the wrong kind namespace.
            Err(EngineError::NotFound {
                node: NodeKind::Entity,
                id,
            })
        }
    }

    /// Fetch a section, requiring the full parent chain to match.
    async fn resolve_section(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
    ) -> Result<(Entity, Section), EngineError> {
        let entity = self.resolve_entity(kind, entity_id).await?;
        let section = self.store.get_section(section_id).await?;
        if section.entity_id == entity_id {
            Ok((entity, section))
        } else {
            Err(EngineError::NotFound {
                node: NodeKind::Section,
                id: section_id,
            })
        }
    }

    /// Fetch an item, requiring the full parent chain to match.
    async fn resolve_item(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
        item_id: NodeId,
    ) -> Result<(Entity, Section, Item), EngineError> {
        let (entity, section) = self.resolve_section(kind, entity_id, section_id).await?;
        let item = self.store.get_item(item_id).await?;
        if item.section_id == section_id {
            Ok((entity, section, item))
        } else {
            Err(EngineError::NotFound {
                node: NodeKind::Item,
                id: item_id,
            })
        }
    }

    // --- entities ---

    /// List entities of one kind, position order.
    ///
    /// The public view drops hidden entities.
    pub async fn list_entities(
        &self,
        kind: EntityKind,
        view: TreeView,
    ) -> Result<Vec<Entity>, EngineError> {
        let mut entities = self.store.list_entities(kind).await?;
        if view == TreeView::Public {
            entities.retain(|e| e.is_visible);
        }
        Ok(entities)
    }

    /// Assemble the nested tree for an entity (see [`TreeView`]).
    pub async fn fetch_tree(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        view: TreeView,
    ) -> Result<EntityTree, EngineError> {
        self.resolve_entity(kind, entity_id).await?;
        tree::fetch(self.store.as_ref(), entity_id, view).await
    }

    /// Create an entity, appended at the end of its kind's sibling group.
    pub async fn create_entity(
        &self,
        kind: EntityKind,
        draft: EntityDraft,
    ) -> Result<Entity, EngineError> {
        if self.store.route_exists(&draft.route).await? {
            return Err(EngineError::Conflict(format!(
                "route {} already exists",
                draft.route
            )));
        }

        let scope = OrderScope::Entities(kind);
        let lock = self.locks.get(scope);
        let _guard = lock.lock().await;

        let siblings = self.store.list_entities(kind).await?;
        let now = Utc::now();
        let entity = Entity {
            id: NodeId::new(),
            kind,
            name: draft.name,
            description: draft.description,
            category: draft.category,
            route: draft.route,
            is_visible: draft.is_visible,
            position: order::append_position(siblings.len()),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_entity(&entity).await?;
        tracing::info!(kind = %kind, entity = %entity.id, "Created entity");
        Ok(entity)
    }

    /// Apply a partial update to an entity.
    pub async fn update_entity(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        patch: EntityPatch,
    ) -> Result<Entity, EngineError> {
        let current = self.resolve_entity(kind, entity_id).await?;
        if let Some(route) = &patch.route
            && route != &current.route
            && self.store.route_exists(route).await?
        {
            return Err(EngineError::Conflict(format!("route {route} already exists")));
        }
        Ok(self.store.update_entity(entity_id, &patch).await?)
    }

    /// Delete an entity and its whole subtree.
    pub async fn delete_entity(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
    ) -> Result<(), EngineError> {
        self.resolve_entity(kind, entity_id).await?;

        let lock = self.locks.get(OrderScope::Entities(kind));
        let _guard = lock.lock().await;

        self.store
            .delete_entity(entity_id)
            .await
            .map_err(EngineError::cascade)?;
        tracing::info!(kind = %kind, entity = %entity_id, "Deleted entity subtree");
        Ok(())
    }

    /// Deep-copy an entity, appended at the end of its kind's sibling group.
    ///
    /// Requires a new unique route; the name defaults to the source name
    /// with a `" (Copy)"` suffix. Returns the new root.
    pub async fn duplicate_entity(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        overrides: DuplicateOverrides,
    ) -> Result<Entity, EngineError> {
        let source_root = self.resolve_entity(kind, entity_id).await?;

        let Some(route) = overrides.new_route else {
            return Err(EngineError::Validation(
                "newRoute is required when duplicating an entity".to_owned(),
            ));
        };
        if route.trim().is_empty() {
            return Err(EngineError::Validation("newRoute must not be empty".to_owned()));
        }
        if self.store.route_exists(&route).await? {
            return Err(EngineError::Conflict(format!("route {route} already exists")));
        }
        let name = overrides
            .new_name
            .unwrap_or_else(|| duplicate::copy_name(&source_root.name));

        let lock = self.locks.get(OrderScope::Entities(kind));
        let _guard = lock.lock().await;

        let source = tree::fetch(self.store.as_ref(), entity_id, TreeView::Admin).await?;
        let siblings = self.store.list_entities(kind).await?;
        let cloned = duplicate::clone_entity_tree(
            &source,
            name,
            route,
            order::append_position(siblings.len()),
        );
        self.store
            .insert_entity_tree(&cloned)
            .await
            .map_err(EngineError::duplication)?;
        tracing::info!(
            kind = %kind,
            source = %entity_id,
            copy = %cloned.entity.id,
            nodes = cloned.node_count(),
            "Duplicated entity subtree"
        );
        Ok(cloned.entity)
    }

    /// Flip an entity's visibility flag; descendants keep theirs.
    pub async fn toggle_entity(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
    ) -> Result<bool, EngineError> {
        self.resolve_entity(kind, entity_id).await?;
        Ok(self
            .store
            .toggle_visibility(NodeKind::Entity, entity_id)
            .await?)
    }

    /// Move an entity to `to` within its kind's sibling group.
    pub async fn move_entity(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        to: usize,
    ) -> Result<(), EngineError> {
        self.resolve_entity(kind, entity_id).await?;

        let lock = self.locks.get(OrderScope::Entities(kind));
        let _guard = lock.lock().await;

        let siblings = self.store.list_entities(kind).await?;
        let ids: Vec<NodeId> = siblings.iter().map(|e| e.id).collect();
        let plan = plan_move(NodeKind::Entity, &ids, entity_id, to)?;
        Ok(self
            .store
            .write_positions(OrderScope::Entities(kind), &plan)
            .await?)
    }

    // --- sections ---

    /// List an entity's sections, position order.
    ///
    /// The public view requires the entity itself to be visible and drops
    /// hidden sections.
    pub async fn list_sections(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        view: TreeView,
    ) -> Result<Vec<Section>, EngineError> {
        let entity = self.resolve_entity(kind, entity_id).await?;
        if view == TreeView::Public && !entity.is_visible {
            return Err(EngineError::NotFound {
                node: NodeKind::Entity,
                id: entity_id,
            });
        }
        let mut sections = self.store.list_sections(entity_id).await?;
        if view == TreeView::Public {
            sections.retain(|s| s.is_visible);
        }
        Ok(sections)
    }

    /// Create a section, appended at the end of the entity's sections.
    pub async fn create_section(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        draft: SectionDraft,
    ) -> Result<Section, EngineError> {
        self.resolve_entity(kind, entity_id).await?;

        let lock = self.locks.get(OrderScope::Sections(entity_id));
        let _guard = lock.lock().await;

        let siblings = self.store.list_sections(entity_id).await?;
        let now = Utc::now();
        let section = Section {
            id: NodeId::new(),
            entity_id,
            section_type: draft.section_type,
            title: draft.title,
            body: draft.body,
            is_visible: draft.is_visible,
            position: order::append_position(siblings.len()),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_section(&section).await?;
        Ok(section)
    }

    /// Apply a partial update to a section.
    pub async fn update_section(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
        patch: SectionPatch,
    ) -> Result<Section, EngineError> {
        self.resolve_section(kind, entity_id, section_id).await?;
        Ok(self.store.update_section(section_id, &patch).await?)
    }

    /// Delete a section and its items.
    pub async fn delete_section(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
    ) -> Result<(), EngineError> {
        self.resolve_section(kind, entity_id, section_id).await?;

        let lock = self.locks.get(OrderScope::Sections(entity_id));
        let _guard = lock.lock().await;

        self.store
            .delete_section(section_id)
            .await
            .map_err(EngineError::cascade)?;
        tracing::info!(entity = %entity_id, section = %section_id, "Deleted section subtree");
        Ok(())
    }

    /// Deep-copy a section (with items) under the same entity, appended
    /// last. Returns the new section.
    pub async fn duplicate_section(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
    ) -> Result<Section, EngineError> {
        let (_, source_section) = self.resolve_section(kind, entity_id, section_id).await?;

        let lock = self.locks.get(OrderScope::Sections(entity_id));
        let _guard = lock.lock().await;

        let items = self.store.list_items(section_id).await?;
        let source = SectionTree {
            section: source_section,
            items,
        };
        let siblings = self.store.list_sections(entity_id).await?;
        let cloned = duplicate::clone_section_tree(
            &source,
            entity_id,
            duplicate::copy_name(&source.section.title),
            order::append_position(siblings.len()),
        );
        self.store
            .insert_section_tree(&cloned)
            .await
            .map_err(EngineError::duplication)?;
        Ok(cloned.section)
    }

    /// Flip a section's visibility flag; items keep theirs.
    pub async fn toggle_section(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
    ) -> Result<bool, EngineError> {
        self.resolve_section(kind, entity_id, section_id).await?;
        Ok(self
            .store
            .toggle_visibility(NodeKind::Section, section_id)
            .await?)
    }

    /// Move a section to `to` within its entity.
    pub async fn move_section(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
        to: usize,
    ) -> Result<(), EngineError> {
        self.resolve_section(kind, entity_id, section_id).await?;

        let lock = self.locks.get(OrderScope::Sections(entity_id));
        let _guard = lock.lock().await;

        let siblings = self.store.list_sections(entity_id).await?;
        let ids: Vec<NodeId> = siblings.iter().map(|s| s.id).collect();
        let plan = plan_move(NodeKind::Section, &ids, section_id, to)?;
        Ok(self
            .store
            .write_positions(OrderScope::Sections(entity_id), &plan)
            .await?)
    }

    // --- items ---

    /// List a section's items, position order.
    ///
    /// The public view requires the whole ancestor chain to be visible and
    /// drops hidden items.
    pub async fn list_items(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
        view: TreeView,
    ) -> Result<Vec<Item>, EngineError> {
        let (entity, section) = self.resolve_section(kind, entity_id, section_id).await?;
        if view == TreeView::Public {
            if !entity.is_visible {
                return Err(EngineError::NotFound {
                    node: NodeKind::Entity,
                    id: entity_id,
                });
            }
            if !section.is_visible {
                return Err(EngineError::NotFound {
                    node: NodeKind::Section,
                    id: section_id,
                });
            }
        }
        let mut items = self.store.list_items(section_id).await?;
        if view == TreeView::Public {
            items.retain(|i| i.is_visible);
        }
        Ok(items)
    }

    /// Create an item, appended at the end of the section's items.
    pub async fn create_item(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
        draft: ItemDraft,
    ) -> Result<Item, EngineError> {
        self.resolve_section(kind, entity_id, section_id).await?;

        let lock = self.locks.get(OrderScope::Items(section_id));
        let _guard = lock.lock().await;

        let siblings = self.store.list_items(section_id).await?;
        let now = Utc::now();
        let item = Item {
            id: NodeId::new(),
            section_id,
            item_type: draft.item_type,
            title: draft.title,
            description: draft.description,
            payload: draft.payload,
            is_visible: draft.is_visible,
            position: order::append_position(siblings.len()),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_item(&item).await?;
        Ok(item)
    }

    /// Apply a partial update to an item.
    pub async fn update_item(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
        item_id: NodeId,
        patch: ItemPatch,
    ) -> Result<Item, EngineError> {
        self.resolve_item(kind, entity_id, section_id, item_id).await?;
        Ok(self.store.update_item(item_id, &patch).await?)
    }

    /// Delete an item.
    pub async fn delete_item(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
        item_id: NodeId,
    ) -> Result<(), EngineError> {
        self.resolve_item(kind, entity_id, section_id, item_id).await?;

        let lock = self.locks.get(OrderScope::Items(section_id));
        let _guard = lock.lock().await;

        self.store
            .delete_item(item_id)
            .await
            .map_err(EngineError::cascade)
    }

    /// Flip an item's visibility flag.
    pub async fn toggle_item(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
        item_id: NodeId,
    ) -> Result<bool, EngineError> {
        self.resolve_item(kind, entity_id, section_id, item_id).await?;
        Ok(self.store.toggle_visibility(NodeKind::Item, item_id).await?)
    }

    /// Move an item to `to` within its section.
    pub async fn move_item(
        &self,
        kind: EntityKind,
        entity_id: NodeId,
        section_id: NodeId,
        item_id: NodeId,
        to: usize,
    ) -> Result<(), EngineError> {
        self.resolve_item(kind, entity_id, section_id, item_id).await?;

        let lock = self.locks.get(OrderScope::Items(section_id));
        let _guard = lock.lock().await;

        let siblings = self.store.list_items(section_id).await?;
        let ids: Vec<NodeId> = siblings.iter().map(|i| i.id).collect();
        let plan = plan_move(NodeKind::Item, &ids, item_id, to)?;
        Ok(self
            .store
            .write_positions(OrderScope::Items(section_id), &plan)
            .await?)
    }
}

/// Build the move assignment batch for `id` within `ids`, validating `to`.
fn plan_move(
    node: NodeKind,
    ids: &[NodeId],
    id: NodeId,
    to: usize,
) -> Result<Vec<(NodeId, i64)>, EngineError> {
    let from = ids.iter().position(|candidate| *candidate == id).ok_or(
        // Listed under the lock, so the node vanished since resolution.
        EngineError::NotFound { node, id },
    )?;
    if to >= ids.len() {
        return Err(EngineError::Validation(format!(
            "target index {to} is out of range (0..{})",
            ids.len()
        )));
    }
    Ok(order::move_plan(ids, from, to))
}
