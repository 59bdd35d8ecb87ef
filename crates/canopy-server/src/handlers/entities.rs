//! Entity endpoints.
//!
//! Entities are addressed as `/api/{kind}/{entityId}`. The tree endpoint
//! returns the nested admin or public view; public responses carry an ETag
//! and honor `If-None-Match` so the rendering layer can poll cheaply.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use canopy_engine::TreeView;
use canopy_model::{DuplicateOverrides, EntityDraft, EntityPatch};
use md5::{Digest, Md5};
use serde::Serialize;

use crate::error::ApiError;
use crate::handlers::{MoveBody, ViewQuery, parse_id, parse_kind, require_non_empty};
use crate::state::AppState;

/// Response for visibility toggles.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VisibilityResponse {
    /// The flag value after the flip.
    pub(crate) is_visible: bool,
}

/// Handle GET /api/{kind}.
pub(crate) async fn list(
    Path(kind): Path<String>,
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entities = state.engine.list_entities(kind, query.view()).await?;
    Ok(Json(entities))
}

/// Handle POST /api/{kind}.
pub(crate) async fn create(
    Path(kind): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<EntityDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    require_non_empty(&draft.name, "name")?;
    require_non_empty(&draft.route, "route")?;

    let entity = state.engine.create_entity(kind, draft).await?;
    Ok((StatusCode::CREATED, Json(entity)))
}

/// Handle GET /api/{kind}/{entityId} (nested tree).
pub(crate) async fn get_tree(
    Path((kind, entity_id)): Path<(String, String)>,
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let view = query.view();
    let tree = state.engine.fetch_tree(kind, entity_id, view).await?;

    if view == TreeView::Admin {
        return Ok(Json(tree).into_response());
    }

    // Public reads are cacheable: hand out an ETag and honor If-None-Match.
    let body = serde_json::to_string(&tree)
        .map_err(|e| ApiError::Validation(format!("serialization failed: {e}")))?;
    let etag = compute_etag(&state.version, &body);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "private, max-age=60".to_owned()),
            (header::CONTENT_TYPE, "application/json".to_owned()),
        ],
        body,
    )
        .into_response())
}

/// Handle PUT /api/{kind}/{entityId}.
pub(crate) async fn update(
    Path((kind, entity_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<EntityPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    if let Some(route) = &patch.route {
        require_non_empty(route, "route")?;
    }
    if let Some(name) = &patch.name {
        require_non_empty(name, "name")?;
    }

    let entity = state.engine.update_entity(kind, entity_id, patch).await?;
    Ok(Json(entity))
}

/// Handle DELETE /api/{kind}/{entityId}.
pub(crate) async fn remove(
    Path((kind, entity_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;

    state.engine.delete_entity(kind, entity_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle PATCH /api/{kind}/{entityId}/visibility.
pub(crate) async fn toggle(
    Path((kind, entity_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;

    let is_visible = state.engine.toggle_entity(kind, entity_id).await?;
    Ok(Json(VisibilityResponse { is_visible }))
}

/// Handle PATCH /api/{kind}/{entityId}/position.
pub(crate) async fn move_position(
    Path((kind, entity_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<MoveBody>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;

    state.engine.move_entity(kind, entity_id, body.to).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle POST /api/{kind}/{entityId}/duplicate.
pub(crate) async fn duplicate(
    Path((kind, entity_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(overrides): Json<DuplicateOverrides>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;

    let entity = state
        .engine
        .duplicate_entity(kind, entity_id, overrides)
        .await?;
    Ok((StatusCode::CREATED, Json(entity)))
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 truncated to 64 bits (16 hex chars) - sufficient for cache
/// invalidation with negligible collision probability.
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
