//! Node records, drafts, and patches.
//!
//! Records are the stored rows. Drafts are the caller-supplied shape for
//! creation (identity, position, and timestamps are assigned by the engine).
//! Patches carry only the fields to change; `None` leaves a field untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::NodeId;
use crate::kind::EntityKind;

fn default_visible() -> bool {
    true
}

/// A top-level content owner (product, solution, marketplace listing, page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Node identity.
    pub id: NodeId,
    /// Entity kind (selects the admin screen and URL namespace).
    pub kind: EntityKind,
    /// Display name.
    pub name: String,
    /// Free-form descriptive text.
    pub description: String,
    /// Category tag shown on listing cards (e.g., "Compute", "Industry").
    pub category: String,
    /// Unique route/slug; the rendering layer maps it to a URL.
    pub route: String,
    /// Whether the entity is included in public rendering.
    pub is_visible: bool,
    /// Sort position among entities of the same kind.
    pub position: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A named content block under one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Node identity.
    pub id: NodeId,
    /// Owning entity.
    pub entity_id: NodeId,
    /// Section type tag (see [`crate::SECTION_TYPES`]).
    pub section_type: String,
    /// Section title.
    pub title: String,
    /// Free-form body content.
    pub body: String,
    /// Whether the section is included in public rendering.
    pub is_visible: bool,
    /// Sort position within the owning entity.
    pub position: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A leaf record under one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Node identity.
    pub id: NodeId,
    /// Owning section.
    pub section_id: NodeId,
    /// Item type tag (see [`crate::ITEM_TYPES`]).
    pub item_type: String,
    /// Item title.
    pub title: String,
    /// Descriptive text.
    pub description: String,
    /// Optional structured payload (price tiers, bullet lists, stat figures).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Whether the item is included in public rendering.
    pub is_visible: bool,
    /// Sort position within the owning section.
    pub position: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating an entity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDraft {
    /// Display name.
    pub name: String,
    /// Free-form descriptive text.
    #[serde(default)]
    pub description: String,
    /// Category tag.
    #[serde(default)]
    pub category: String,
    /// Unique route/slug.
    pub route: String,
    /// Initial visibility (defaults to visible).
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

/// Caller-supplied fields for creating a section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDraft {
    /// Section type tag.
    pub section_type: String,
    /// Section title.
    pub title: String,
    /// Free-form body content.
    #[serde(default)]
    pub body: String,
    /// Initial visibility (defaults to visible).
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

/// Caller-supplied fields for creating an item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    /// Item type tag.
    pub item_type: String,
    /// Item title.
    pub title: String,
    /// Descriptive text.
    #[serde(default)]
    pub description: String,
    /// Optional structured payload.
    #[serde(default)]
    pub payload: Option<Value>,
    /// Initial visibility (defaults to visible).
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

/// Partial update for an entity. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPatch {
    /// New display name.
    pub name: Option<String>,
    /// New descriptive text.
    pub description: Option<String>,
    /// New category tag.
    pub category: Option<String>,
    /// New route/slug (must stay unique).
    pub route: Option<String>,
}

/// Partial update for a section. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPatch {
    /// New section type tag.
    pub section_type: Option<String>,
    /// New title.
    pub title: Option<String>,
    /// New body content.
    pub body: Option<String>,
}

/// Partial update for an item. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    /// New item type tag.
    pub item_type: Option<String>,
    /// New title.
    pub title: Option<String>,
    /// New descriptive text.
    pub description: Option<String>,
    /// New structured payload. `Some(Value::Null)` clears it.
    pub payload: Option<Value>,
}

/// Root overrides for duplication.
///
/// Entity duplication requires `new_route`; `new_name` defaults to the
/// source name with a `" (Copy)"` suffix.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateOverrides {
    /// Display name for the copy.
    pub new_name: Option<String>,
    /// Route for the copy (required for entities, must be unique).
    pub new_route: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_entity_draft_defaults() {
        let draft: EntityDraft =
            serde_json::from_str(r#"{"name": "Object Storage", "route": "/products/storage"}"#)
                .unwrap();

        assert_eq!(draft.name, "Object Storage");
        assert_eq!(draft.description, "");
        assert_eq!(draft.category, "");
        assert!(draft.is_visible);
    }

    #[test]
    fn test_item_draft_with_payload() {
        let draft: ItemDraft = serde_json::from_str(
            r#"{
                "itemType": "pricing_plan",
                "title": "Starter",
                "payload": {"monthly": 9, "features": ["1 vCPU", "2 GB RAM"]}
            }"#,
        )
        .unwrap();

        assert_eq!(draft.item_type, "pricing_plan");
        assert_eq!(draft.payload.unwrap()["monthly"], 9);
    }

    #[test]
    fn test_patch_absent_fields_are_none() {
        let patch: SectionPatch = serde_json::from_str(r#"{"title": "Key features"}"#).unwrap();

        assert_eq!(patch.title.as_deref(), Some("Key features"));
        assert_eq!(patch.section_type, None);
        assert_eq!(patch.body, None);
    }

    #[test]
    fn test_entity_serializes_camel_case() {
        let entity = Entity {
            id: NodeId::new(),
            kind: EntityKind::Products,
            name: "Compute".to_owned(),
            description: String::new(),
            category: "Compute".to_owned(),
            route: "/products/compute".to_owned(),
            is_visible: true,
            position: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&entity).unwrap();

        assert_eq!(json["isVisible"], true);
        assert_eq!(json["route"], "/products/compute");
        assert!(json.get("is_visible").is_none());
    }
}
