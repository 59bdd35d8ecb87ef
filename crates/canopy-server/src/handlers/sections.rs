//! Section endpoints.
//!
//! Sections are addressed through their owning entity:
//! `/api/{kind}/{entityId}/sections/{sectionId}`. A section id outside the
//! addressed entity resolves as not found.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use canopy_model::{SectionDraft, SectionPatch, is_section_type};

use crate::error::ApiError;
use crate::handlers::entities::VisibilityResponse;
use crate::handlers::{MoveBody, ViewQuery, parse_id, parse_kind, require_non_empty};
use crate::state::AppState;

fn require_section_type(tag: &str) -> Result<(), ApiError> {
    if !is_section_type(tag) {
        return Err(ApiError::Validation(format!("unknown section type: {tag}")));
    }
    Ok(())
}

/// Handle GET /api/{kind}/{entityId}/sections.
pub(crate) async fn list(
    Path((kind, entity_id)): Path<(String, String)>,
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;

    let sections = state
        .engine
        .list_sections(kind, entity_id, query.view())
        .await?;
    Ok(Json(sections))
}

/// Handle POST /api/{kind}/{entityId}/sections.
pub(crate) async fn create(
    Path((kind, entity_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<SectionDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    require_non_empty(&draft.title, "title")?;
    require_section_type(&draft.section_type)?;

    let section = state.engine.create_section(kind, entity_id, draft).await?;
    Ok((StatusCode::CREATED, Json(section)))
}

/// Handle PUT /api/{kind}/{entityId}/sections/{sectionId}.
pub(crate) async fn update(
    Path((kind, entity_id, section_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SectionPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let section_id = parse_id(&section_id, "sectionId")?;
    if let Some(section_type) = &patch.section_type {
        require_section_type(section_type)?;
    }
    if let Some(title) = &patch.title {
        require_non_empty(title, "title")?;
    }

    let section = state
        .engine
        .update_section(kind, entity_id, section_id, patch)
        .await?;
    Ok(Json(section))
}

/// Handle DELETE /api/{kind}/{entityId}/sections/{sectionId}.
pub(crate) async fn remove(
    Path((kind, entity_id, section_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let section_id = parse_id(&section_id, "sectionId")?;

    state
        .engine
        .delete_section(kind, entity_id, section_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle PATCH /api/{kind}/{entityId}/sections/{sectionId}/visibility.
pub(crate) async fn toggle(
    Path((kind, entity_id, section_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let section_id = parse_id(&section_id, "sectionId")?;

    let is_visible = state
        .engine
        .toggle_section(kind, entity_id, section_id)
        .await?;
    Ok(Json(VisibilityResponse { is_visible }))
}

/// Handle PATCH /api/{kind}/{entityId}/sections/{sectionId}/position.
pub(crate) async fn move_position(
    Path((kind, entity_id, section_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<MoveBody>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let section_id = parse_id(&section_id, "sectionId")?;

    state
        .engine
        .move_section(kind, entity_id, section_id, body.to)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle POST /api/{kind}/{entityId}/sections/{sectionId}/duplicate.
pub(crate) async fn duplicate(
    Path((kind, entity_id, section_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity_id = parse_id(&entity_id, "entityId")?;
    let section_id = parse_id(&section_id, "sectionId")?;

    let section = state
        .engine
        .duplicate_section(kind, entity_id, section_id)
        .await?;
    Ok((StatusCode::CREATED, Json(section)))
}
