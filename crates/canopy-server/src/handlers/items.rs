//! Item endpoints.
//!
//! Items are addressed through their full parent chain:
//! `/api/{kind}/{entityId}/sections/{sectionId}/items/{itemId}`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use canopy_model::{ItemDraft, ItemPatch, is_item_type};

use crate::error::ApiError;
use crate::handlers::entities::VisibilityResponse;
use crate::handlers::{MoveBody, ViewQuery, parse_id, parse_kind, require_non_empty};
use crate::state::AppState;

fn require_item_type(tag: &str) -> Result<(), ApiError> {
    if !is_item_type(tag) {
        return Err(ApiError::Validation(format!("unknown item type: {tag}")));
    }
    Ok(())
}

/// Handle GET /api/{kind}/{entityId}/sections/{sectionId}/items.
pub(crate) async fn list(
    Path((kind, entity_id, section_id)): Path<(String, String, String)>,
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let section_id = parse_id(&section_id, "sectionId")?;

    let items = state
        .engine
        .list_items(kind, entity_id, section_id, query.view())
        .await?;
    Ok(Json(items))
}

/// Handle POST /api/{kind}/{entityId}/sections/{sectionId}/items.
pub(crate) async fn create(
    Path((kind, entity_id, section_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ItemDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let section_id = parse_id(&section_id, "sectionId")?;
    require_non_empty(&draft.title, "title")?;
    require_item_type(&draft.item_type)?;

    let item = state
        .engine
        .create_item(kind, entity_id, section_id, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Handle PUT /api/{kind}/{entityId}/sections/{sectionId}/items/{itemId}.
pub(crate) async fn update(
    Path((kind, entity_id, section_id, item_id)): Path<(String, String, String, String)>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ItemPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let section_id = parse_id(&section_id, "sectionId")?;
    let item_id = parse_id(&item_id, "itemId")?;
    if let Some(item_type) = &patch.item_type {
        require_item_type(item_type)?;
    }
    if let Some(title) = &patch.title {
        require_non_empty(title, "title")?;
    }

    let item = state
        .engine
        .update_item(kind, entity_id, section_id, item_id, patch)
        .await?;
    Ok(Json(item))
}

/// Handle DELETE /api/{kind}/{entityId}/sections/{sectionId}/items/{itemId}.
pub(crate) async fn remove(
    Path((kind, entity_id, section_id, item_id)): Path<(String, String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let section_id = parse_id(&section_id, "sectionId")?;
    let item_id = parse_id(&item_id, "itemId")?;

    state
        .engine
        .delete_item(kind, entity_id, section_id, item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle PATCH .../items/{itemId}/visibility.
pub(crate) async fn toggle(
    Path((kind, entity_id, section_id, item_id)): Path<(String, String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let section_id = parse_id(&section_id, "sectionId")?;
    let item_id = parse_id(&item_id, "itemId")?;

    let is_visible = state
        .engine
        .toggle_item(kind, entity_id, section_id, item_id)
        .await?;
    Ok(Json(VisibilityResponse { is_visible }))
}

/// Handle PATCH .../items/{itemId}/position.
pub(crate) async fn move_position(
    Path((kind, entity_id, section_id, item_id)): Path<(String, String, String, String)>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<MoveBody>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let section_id = parse_id(&section_id, "sectionId")?;
    let item_id = parse_id(&item_id, "itemId")?;

    state
        .engine
        .move_item(kind, entity_id, section_id, item_id, body.to)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
