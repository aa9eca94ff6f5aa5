//! Hierarchy canvas handlers
//!
//! Each call reads the collection fresh, decides on the pure canvas rules,
//! writes at most one record and answers with the refetched list.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::personnel::collection;
use crate::error::{AppError, AppResult, OptionExt};
use crate::hierarchy::canvas::unlink;
use crate::hierarchy::{self, ChartLayout, DropRequest, LinkOutcome, LinkState, Point};
use crate::model::{Collection, PersonnelPatch, PersonnelRecord};
use crate::routes::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    #[serde(rename = "sourceId")]
    pub source_id: String,
    #[serde(rename = "targetId")]
    pub target_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UnlinkRequest {
    #[serde(rename = "parentId")]
    pub parent_id: String,
    #[serde(rename = "childId")]
    pub child_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasChange {
    Linked,
    AlreadyLinked,
    Discarded,
    Unlinked,
    NotLinked,
    Moved,
}

#[derive(Debug, Serialize)]
pub struct CanvasResult {
    pub change: CanvasChange,
    pub records: Vec<PersonnelRecord>,
}

async fn finish(state: &AppState, collection: Collection, change: CanvasChange) -> AppResult<Json<ApiResponse<CanvasResult>>> {
    if matches!(change, CanvasChange::Linked | CanvasChange::Unlinked | CanvasChange::Moved) {
        state.publisher.revalidate(collection.public_path());
    }
    let records = state.personnel.list(collection).await?;
    Ok(Json(ApiResponse::success(CanvasResult { change, records })))
}

/// POST /api/personnel/:collection/link
///
/// The source becomes a parent of the target.
pub async fn link(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<LinkRequest>,
) -> AppResult<Json<ApiResponse<CanvasResult>>> {
    let collection = collection(&name)?;
    let records = state.personnel.list(collection).await?;
    let target = records
        .iter()
        .find(|r| r.id == req.target_id)
        .ok_or_not_found(format!("Record {} not found", req.target_id))?;

    let (_, outcome) = LinkState::Idle
        .begin(req.source_id.as_str(), Point::default())
        .release(Some(target), &records);

    let change = match outcome {
        LinkOutcome::Link { child_id, parent_ids } => {
            state
                .personnel
                .update(collection, &child_id, PersonnelPatch::parents(parent_ids))
                .await
                .map_err(|e| {
                    tracing::error!("Failed to link {} -> {}: {}", req.source_id, child_id, e);
                    e
                })?;
            tracing::info!("Linked {} record {} under {}", collection, child_id, req.source_id);
            CanvasChange::Linked
        }
        LinkOutcome::AlreadyLinked => CanvasChange::AlreadyLinked,
        LinkOutcome::Discarded => CanvasChange::Discarded,
        LinkOutcome::Rejected(rejection) => {
            tracing::warn!("Link {} -> {} rejected: {}", req.source_id, req.target_id, rejection);
            return Err(AppError::Rule(rejection.to_string()));
        }
    };

    finish(&state, collection, change).await
}

/// POST /api/personnel/:collection/unlink
pub async fn unlink_records(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<UnlinkRequest>,
) -> AppResult<Json<ApiResponse<CanvasResult>>> {
    let collection = collection(&name)?;
    let child = state.personnel.get(collection, &req.child_id).await?;

    let change = match unlink(&child, &req.parent_id) {
        Some(parent_ids) => {
            state
                .personnel
                .update(collection, &child.id, PersonnelPatch::parents(parent_ids))
                .await?;
            tracing::info!("Unlinked {} record {} from {}", collection, child.id, req.parent_id);
            CanvasChange::Unlinked
        }
        None => CanvasChange::NotLinked,
    };

    finish(&state, collection, change).await
}

/// POST /api/personnel/:collection/move
///
/// Writes level and order together. Sibling orders are not renumbered.
pub async fn move_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<DropRequest>,
) -> AppResult<Json<ApiResponse<CanvasResult>>> {
    let collection = collection(&name)?;
    let placement = req.placement()?;
    state
        .personnel
        .update(collection, &req.id, PersonnelPatch::placement(placement.level, placement.order))
        .await
        .map_err(|e| {
            tracing::error!("Failed to move {} record {}: {}", collection, req.id, e);
            e
        })?;

    tracing::info!(
        "Moved {} record {} to level {} slot {}",
        collection,
        req.id,
        placement.level,
        placement.order
    );
    finish(&state, collection, CanvasChange::Moved).await
}

/// GET /api/personnel/:collection/chart
pub async fn chart(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<ChartLayout>>> {
    let collection = collection(&name)?;
    let records = state.personnel.list(collection).await?;
    Ok(Json(ApiResponse::success(hierarchy::chart_layout(&records))))
}
