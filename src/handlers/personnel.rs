//! Personnel record handlers
//!
//! CRUD over the staff, PTA and LPS collections for the admin tables and
//! the edit form. Every write asks the public site to rebuild the
//! collection's page.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::hierarchy::{self, ListQuery, Page, ParentOption, PersonnelForm};
use crate::model::{Collection, PersonnelRecord};
use crate::routes::ApiResponse;
use crate::state::AppState;

/// A saved record plus the parents that sit at or below its level
#[derive(Debug, Serialize)]
pub struct SavedRecord {
    #[serde(flatten)]
    pub record: PersonnelRecord,
    #[serde(rename = "levelWarnings")]
    pub level_warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParentOptionsQuery {
    /// Record being edited; absent on create
    #[serde(default)]
    pub id: Option<String>,
    /// Comma-separated ids already chosen
    #[serde(default)]
    pub selected: Option<String>,
}

pub(crate) fn collection(name: &str) -> AppResult<Collection> {
    name.parse()
}

async fn saved(state: &AppState, collection: Collection, record: PersonnelRecord) -> AppResult<SavedRecord> {
    let records = state.personnel.list(collection).await?;
    let level_warnings = hierarchy::level_warnings(&record, &records);
    if !level_warnings.is_empty() {
        tracing::warn!(
            "{} {} reports to {:?} at the same or a lower level",
            collection,
            record.id,
            level_warnings
        );
    }
    Ok(SavedRecord { record, level_warnings })
}

/// GET /api/personnel/:collection
pub async fn list_records(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Page<PersonnelRecord>>>> {
    let collection = collection(&name)?;
    let records = state.personnel.list(collection).await?;
    let page = hierarchy::list_page(&records, &query, state.config.listing.page_size);
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/personnel/:collection/all
pub async fn all_records(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<PersonnelRecord>>>> {
    let collection = collection(&name)?;
    let records = state.personnel.list(collection).await?;
    Ok(Json(ApiResponse::success(records)))
}

/// GET /api/personnel/:collection/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    let collection = collection(&name)?;
    let records = state.personnel.list(collection).await?;
    Ok(Json(ApiResponse::success(hierarchy::categories(&records))))
}

/// GET /api/personnel/:collection/parent-options
pub async fn parent_options(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ParentOptionsQuery>,
) -> AppResult<Json<ApiResponse<Vec<ParentOption>>>> {
    let collection = collection(&name)?;
    let records = state.personnel.list(collection).await?;
    let selected: Vec<String> = query
        .selected
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let options = hierarchy::parent_options(&records, query.id.as_deref(), &selected);
    Ok(Json(ApiResponse::success(options)))
}

/// POST /api/personnel/:collection
pub async fn create_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(form): Json<PersonnelForm>,
) -> AppResult<Json<ApiResponse<SavedRecord>>> {
    let collection = collection(&name)?;
    let draft = form.into_draft()?;
    let record = state.personnel.create(collection, draft).await.map_err(|e| {
        tracing::error!("Failed to create {} record: {}", collection, e);
        e
    })?;

    tracing::info!("Created {} record {} ({})", collection, record.id, record.name);
    state.publisher.revalidate(collection.public_path());
    Ok(Json(ApiResponse::success(saved(&state, collection, record).await?)))
}

/// PUT /api/personnel/:collection/:id
pub async fn update_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    Json(form): Json<PersonnelForm>,
) -> AppResult<Json<ApiResponse<SavedRecord>>> {
    let collection = collection(&name)?;
    let patch = form.into_patch(&id)?;
    let record = state.personnel.update(collection, &id, patch).await.map_err(|e| {
        tracing::error!("Failed to update {} record {}: {}", collection, id, e);
        e
    })?;

    tracing::info!("Updated {} record {}", collection, id);
    state.publisher.revalidate(collection.public_path());
    Ok(Json(ApiResponse::success(saved(&state, collection, record).await?)))
}

/// DELETE /api/personnel/:collection/:id
///
/// Children keep the deleted id in their `parentIds`.
pub async fn delete_record(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let collection = collection(&name)?;
    state.personnel.delete(collection, &id).await.map_err(|e| {
        tracing::error!("Failed to delete {} record {}: {}", collection, id, e);
        e
    })?;

    tracing::info!("Deleted {} record {}", collection, id);
    state.publisher.revalidate(collection.public_path());
    Ok(Json(ApiResponse::success_msg("deleted")))
}
