//! Content tree engine.
//!
//! Every admin screen of the site edits the same tree shape: an entity owns
//! ordered sections, a section owns ordered items. This crate is the one
//! implementation of the logic those screens share:
//!
//! - **Tree access** — nested read views for admin editing (everything) or
//!   public rendering (hidden subtrees pruned), via [`ContentEngine::fetch_tree`].
//! - **Ordering** — contiguous, gap-free positions within every sibling
//!   group, recomputed on insert, move, and delete ([`order`]).
//! - **Visibility** — per-node flag flips that never cascade.
//! - **Duplication** — deep copies under fresh identities, appended at the
//!   end of the sibling group, committed as one atomic unit ([`duplicate`]).
//! - **Cascade deletion** — a node and its whole subtree removed as one
//!   unit, with the parent's ordering gap closed in the same unit.
//!
//! # Concurrency
//!
//! The ordering invariant is not self-stabilizing under interleaved writes,
//! so the engine serializes mutations per sibling group: each mutation holds
//! an async lock for the [`OrderScope`](canopy_model::OrderScope) it can
//! disturb. Reads take no locks. Multi-row writes are additionally atomic in
//! the store, so a failure mid-operation leaves no partial state and any
//! failed call can be safely retried.

mod engine;
mod error;
mod locks;
mod tree;

pub mod duplicate;
pub mod order;

pub use engine::ContentEngine;
pub use error::EngineError;
pub use tree::TreeView;
