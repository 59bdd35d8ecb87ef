//! SQLite storage backend.
//!
//! All queries are runtime-checked (`sqlx::query`) so the crate builds
//! without a database at hand. Multi-row units run inside one transaction;
//! a failed transaction rolls back on drop, leaving the store untouched.

use std::path::Path;

use async_trait::async_trait;
use canopy_model::{
    Entity, EntityKind, EntityPatch, EntityTree, Item, ItemPatch, NodeId, NodeKind, OrderScope,
    Section, SectionPatch, SectionTree,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::error::{StoreError, StoreErrorKind};
use crate::schema;
use crate::store::ContentStore;

/// SQLite-backed [`ContentStore`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a database file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened.
    pub async fn connect(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Open an in-memory database.
    ///
    /// The pool is pinned to a single connection: every pooled connection
    /// would otherwise see its own empty in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the connection cannot be established.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Create tables and indexes if missing. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a schema statement fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        schema::apply(&self.pool).await
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Table for a node level.
fn table(node: NodeKind) -> &'static str {
    match node {
        NodeKind::Entity => "entities",
        NodeKind::Section => "sections",
        NodeKind::Item => "items",
    }
}

fn parse_id(raw: &str) -> Result<NodeId, StoreError> {
    NodeId::parse(raw).map_err(|e| {
        StoreError::new(StoreErrorKind::InvalidRecord)
            .with_backend("Sqlite")
            .with_detail(format!("bad id {raw}"))
            .with_source(e)
    })
}

fn entity_from_row(row: &SqliteRow) -> Result<Entity, StoreError> {
    let id: String = row.try_get("id")?;
    let kind: String = row.try_get("kind")?;
    Ok(Entity {
        id: parse_id(&id)?,
        kind: kind.parse::<EntityKind>().map_err(|e| {
            StoreError::new(StoreErrorKind::InvalidRecord)
                .with_backend("Sqlite")
                .with_source(e)
        })?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        route: row.try_get("route")?,
        is_visible: row.try_get("is_visible")?,
        position: row.try_get("position")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn section_from_row(row: &SqliteRow) -> Result<Section, StoreError> {
    let id: String = row.try_get("id")?;
    let entity_id: String = row.try_get("entity_id")?;
    Ok(Section {
        id: parse_id(&id)?,
        entity_id: parse_id(&entity_id)?,
        section_type: row.try_get("section_type")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        is_visible: row.try_get("is_visible")?,
        position: row.try_get("position")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn item_from_row(row: &SqliteRow) -> Result<Item, StoreError> {
    let id: String = row.try_get("id")?;
    let section_id: String = row.try_get("section_id")?;
    let payload: Option<String> = row.try_get("payload")?;
    let payload = payload
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|e| {
                StoreError::new(StoreErrorKind::InvalidRecord)
                    .with_backend("Sqlite")
                    .with_detail("bad item payload")
                    .with_source(e)
            })
        })
        .transpose()?;
    Ok(Item {
        id: parse_id(&id)?,
        section_id: parse_id(&section_id)?,
        item_type: row.try_get("item_type")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        payload,
        is_visible: row.try_get("is_visible")?,
        position: row.try_get("position")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

async fn insert_entity_row(
    conn: &mut SqliteConnection,
    entity: &Entity,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO entities
         (id, kind, name, description, category, route, is_visible, position, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(entity.id.to_string())
    .bind(entity.kind.as_str())
    .bind(&entity.name)
    .bind(&entity.description)
    .bind(&entity.category)
    .bind(&entity.route)
    .bind(entity.is_visible)
    .bind(entity.position)
    .bind(entity.created_at)
    .bind(entity.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

async fn insert_section_row(
    conn: &mut SqliteConnection,
    section: &Section,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO sections
         (id, entity_id, section_type, title, body, is_visible, position, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(section.id.to_string())
    .bind(section.entity_id.to_string())
    .bind(&section.section_type)
    .bind(&section.title)
    .bind(&section.body)
    .bind(section.is_visible)
    .bind(section.position)
    .bind(section.created_at)
    .bind(section.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

async fn insert_item_row(conn: &mut SqliteConnection, item: &Item) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO items
         (id, section_id, item_type, title, description, payload, is_visible, position, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(item.id.to_string())
    .bind(item.section_id.to_string())
    .bind(&item.item_type)
    .bind(&item.title)
    .bind(&item.description)
    .bind(item.payload.as_ref().map(ToString::to_string))
    .bind(item.is_visible)
    .bind(item.position)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn list_entities(&self, kind: EntityKind) -> Result<Vec<Entity>, StoreError> {
        let rows = sqlx::query("SELECT * FROM entities WHERE kind = ?1 ORDER BY position ASC")
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(entity_from_row).collect()
    }

    async fn get_entity(&self, id: NodeId) -> Result<Entity, StoreError> {
        let row = sqlx::query("SELECT * FROM entities WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(NodeKind::Entity, id).with_backend("Sqlite"))?;
        entity_from_row(&row)
    }

    async fn insert_entity(&self, entity: &Entity) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_entity_row(&mut conn, entity).await
    }

    async fn update_entity(&self, id: NodeId, patch: &EntityPatch) -> Result<Entity, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT * FROM entities WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found(NodeKind::Entity, id).with_backend("Sqlite"))?;
        let mut entity = entity_from_row(&row)?;

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

        sqlx::query(
            "UPDATE entities
             SET name = ?2, description = ?3, category = ?4, route = ?5, updated_at = ?6
             WHERE id = ?1",
        )
        .bind(id.to_string())
        .bind(&entity.name)
        .bind(&entity.description)
        .bind(&entity.category)
        .bind(&entity.route)
        .bind(entity.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(entity)
    }

    async fn list_sections(&self, entity_id: NodeId) -> Result<Vec<Section>, StoreError> {
        let rows = sqlx::query("SELECT * FROM sections WHERE entity_id = ?1 ORDER BY position ASC")
            .bind(entity_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(section_from_row).collect()
    }

    async fn get_section(&self, id: NodeId) -> Result<Section, StoreError> {
        let row = sqlx::query("SELECT * FROM sections WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(NodeKind::Section, id).with_backend("Sqlite"))?;
        section_from_row(&row)
    }

    async fn insert_section(&self, section: &Section) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_section_row(&mut conn, section).await
    }

    async fn update_section(
        &self,
        id: NodeId,
        patch: &SectionPatch,
    ) -> Result<Section, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT * FROM sections WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found(NodeKind::Section, id).with_backend("Sqlite"))?;
        let mut section = section_from_row(&row)?;

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

        sqlx::query(
            "UPDATE sections
             SET section_type = ?2, title = ?3, body = ?4, updated_at = ?5
             WHERE id = ?1",
        )
        .bind(id.to_string())
        .bind(&section.section_type)
        .bind(&section.title)
        .bind(&section.body)
        .bind(section.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(section)
    }

    async fn list_items(&self, section_id: NodeId) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query("SELECT * FROM items WHERE section_id = ?1 ORDER BY position ASC")
            .bind(section_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn get_item(&self, id: NodeId) -> Result<Item, StoreError> {
        let row = sqlx::query("SELECT * FROM items WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(NodeKind::Item, id).with_backend("Sqlite"))?;
        item_from_row(&row)
    }

    async fn insert_item(&self, item: &Item) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        insert_item_row(&mut conn, item).await
    }

    async fn update_item(&self, id: NodeId, patch: &ItemPatch) -> Result<Item, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT * FROM items WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found(NodeKind::Item, id).with_backend("Sqlite"))?;
        let mut item = item_from_row(&row)?;

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
            // Explicit null clears the payload.
            item.payload = if payload.is_null() {
                None
            } else {
                Some(payload.clone())
            };
        }
        item.updated_at = Utc::now();

        sqlx::query(
            "UPDATE items
             SET item_type = ?2, title = ?3, description = ?4, payload = ?5, updated_at = ?6
             WHERE id = ?1",
        )
        .bind(id.to_string())
        .bind(&item.item_type)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.payload.as_ref().map(ToString::to_string))
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn toggle_visibility(&self, node: NodeKind, id: NodeId) -> Result<bool, StoreError> {
        let sql = format!(
            "UPDATE {} SET is_visible = NOT is_visible, updated_at = ?2
             WHERE id = ?1 RETURNING is_visible",
            table(node)
        );
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found(node, id).with_backend("Sqlite"))?;
        Ok(row.try_get("is_visible")?)
    }

    async fn write_positions(
        &self,
        scope: OrderScope,
        assignments: &[(NodeId, i64)],
    ) -> Result<(), StoreError> {
        let node = match scope {
            OrderScope::Entities(_) => NodeKind::Entity,
            OrderScope::Sections(_) => NodeKind::Section,
            OrderScope::Items(_) => NodeKind::Item,
        };
        let sql = format!("UPDATE {} SET position = ?2 WHERE id = ?1", table(node));

        let mut tx = self.pool.begin().await?;
        for (id, position) in assignments {
            sqlx::query(&sql)
                .bind(id.to_string())
                .bind(position)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        tracing::debug!(%scope, rows = assignments.len(), "Rewrote positions");
        Ok(())
    }

    async fn route_exists(&self, route: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM entities WHERE route = ?1) AS hit")
            .bind(route)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("hit")?)
    }

    async fn insert_entity_tree(&self, tree: &EntityTree) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        insert_entity_row(&mut tx, &tree.entity).await?;
        for section in &tree.sections {
            insert_section_row(&mut tx, &section.section).await?;
            for item in &section.items {
                insert_item_row(&mut tx, item).await?;
            }
        }
        tx.commit().await?;
        tracing::debug!(entity = %tree.entity.id, nodes = tree.node_count(), "Inserted entity tree");
        Ok(())
    }

    async fn insert_section_tree(&self, tree: &SectionTree) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        insert_section_row(&mut tx, &tree.section).await?;
        for item in &tree.items {
            insert_item_row(&mut tx, item).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_entity(&self, id: NodeId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT kind, position FROM entities WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found(NodeKind::Entity, id).with_backend("Sqlite"))?;
        let kind: String = row.try_get("kind")?;
        let position: i64 = row.try_get("position")?;

        sqlx::query(
            "DELETE FROM items WHERE section_id IN (SELECT id FROM sections WHERE entity_id = ?1)",
        )
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM sections WHERE entity_id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM entities WHERE id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        // Close the gap left in the kind's sibling sequence.
        sqlx::query("UPDATE entities SET position = position - 1 WHERE kind = ?1 AND position > ?2")
            .bind(&kind)
            .bind(position)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::debug!(entity = %id, "Deleted entity subtree");
        Ok(())
    }

    async fn delete_section(&self, id: NodeId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT entity_id, position FROM sections WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found(NodeKind::Section, id).with_backend("Sqlite"))?;
        let entity_id: String = row.try_get("entity_id")?;
        let position: i64 = row.try_get("position")?;

        sqlx::query("DELETE FROM items WHERE section_id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sections WHERE id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE sections SET position = position - 1 WHERE entity_id = ?1 AND position > ?2",
        )
        .bind(&entity_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_item(&self, id: NodeId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT section_id, position FROM items WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found(NodeKind::Item, id).with_backend("Sqlite"))?;
        let section_id: String = row.try_get("section_id")?;
        let position: i64 = row.try_get("position")?;

        sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE items SET position = position - 1 WHERE section_id = ?1 AND position > ?2",
        )
        .bind(&section_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}
