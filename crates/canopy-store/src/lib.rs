//! Durable content storage for the Canopy engine.
//!
//! This crate provides the [`ContentStore`] trait: row-level CRUD for
//! entities, sections, and items, plus the small set of multi-row units
//! (subtree insert, cascade delete, position batch) that must be atomic.
//! Keeping atomicity here lets the engine treat every mutation as
//! all-or-nothing regardless of backend.
//!
//! # Backends
//!
//! - [`SqliteStore`] — sqlx/SQLite, the production backend. Multi-row units
//!   run inside a single transaction.
//! - [`MemoryStore`] (feature `mock`) — in-memory tables for unit testing,
//!   with a write fault injector so rollback behavior is testable.
//!
//! # Example
//!
//! ```ignore
//! use canopy_store::{ContentStore, SqliteStore};
//!
//! let store = SqliteStore::connect(Path::new("content.db")).await?;
//! store.migrate().await?;
//! let products = store.list_entities(EntityKind::Products).await?;
//! ```

mod error;
#[cfg(feature = "mock")]
mod memory;
mod schema;
mod sqlite;
mod store;

pub use error::{StoreError, StoreErrorKind};
#[cfg(feature = "mock")]
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::ContentStore;
