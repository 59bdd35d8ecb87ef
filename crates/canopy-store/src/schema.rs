//! SQLite schema.
//!
//! Applied with `CREATE TABLE IF NOT EXISTS` so `migrate()` is idempotent
//! and safe to run on every startup.

use sqlx::SqlitePool;

use crate::error::StoreError;

const CREATE_ENTITIES: &str = "
CREATE TABLE IF NOT EXISTS entities (
    id          TEXT PRIMARY KEY,
    kind        TEXT NOT NULL,
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    category    TEXT NOT NULL DEFAULT '',
    route       TEXT NOT NULL UNIQUE,
    is_visible  INTEGER NOT NULL DEFAULT 1,
    position    INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
)";

const CREATE_SECTIONS: &str = "
CREATE TABLE IF NOT EXISTS sections (
    id           TEXT PRIMARY KEY,
    entity_id    TEXT NOT NULL REFERENCES entities (id),
    section_type TEXT NOT NULL,
    title        TEXT NOT NULL,
    body         TEXT NOT NULL DEFAULT '',
    is_visible   INTEGER NOT NULL DEFAULT 1,
    position     INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
)";

const CREATE_ITEMS: &str = "
CREATE TABLE IF NOT EXISTS items (
    id          TEXT PRIMARY KEY,
    section_id  TEXT NOT NULL REFERENCES sections (id),
    item_type   TEXT NOT NULL,
    title       TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    payload     TEXT,
    is_visible  INTEGER NOT NULL DEFAULT 1,
    position    INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
)";

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_entities_kind ON entities (kind, position)",
    "CREATE INDEX IF NOT EXISTS idx_sections_entity ON sections (entity_id, position)",
    "CREATE INDEX IF NOT EXISTS idx_items_section ON items (section_id, position)",
];

/// Create tables and indexes if they do not exist yet.
pub(crate) async fn apply(pool: &SqlitePool) -> Result<(), StoreError> {
    for statement in [CREATE_ENTITIES, CREATE_SECTIONS, CREATE_ITEMS]
        .iter()
        .chain(CREATE_INDEXES)
    {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!("Schema applied");
    Ok(())
}
