//! Data model for the Canopy content tree.
//!
//! The whole site is one tree shape repeated per content kind: a top-level
//! [`Entity`] (product, solution, marketplace listing, page) owns an ordered
//! list of [`Section`]s, each of which owns an ordered list of [`Item`]s.
//! This crate defines the records, their identities, the type-tag
//! vocabularies, and the nested read views. It performs no I/O.
//!
//! # Ordering
//!
//! Every node carries a `position` that is contiguous (`0..n-1`) within its
//! sibling group. The sibling group of an entity is all entities of the same
//! [`EntityKind`]; for sections it is the owning entity; for items the owning
//! section. [`OrderScope`] names one such group.

mod id;
mod kind;
mod node;
mod scope;
mod tree;

pub use id::{NodeId, NodeKind};
pub use kind::{
    EntityKind, ITEM_TYPES, SECTION_TYPES, UnknownEntityKind, is_item_type, is_section_type,
};
pub use node::{
    DuplicateOverrides, Entity, EntityDraft, EntityPatch, Item, ItemDraft, ItemPatch, Section,
    SectionDraft, SectionPatch,
};
pub use scope::OrderScope;
pub use tree::{EntityTree, SectionTree};
