//! Upload proxy
//!
//! The admin panel sends images and attachments here; they are forwarded to
//! the image host and the returned URL goes into the record.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::routes::ApiResponse;
use crate::services::{UploadFile, UploadedAsset};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteUploadRequest {
    #[serde(rename = "publicId", alias = "public_id")]
    pub public_id: String,
}

/// POST /api/upload
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadedAsset>>> {
    let mut file: Option<UploadFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or("upload")
            .to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        file = Some(UploadFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let file = file.ok_or_else(|| AppError::BadRequest("missing file field".to_string()))?;
    if file.bytes.is_empty() {
        return Err(AppError::BadRequest(format!("{} is empty", file.file_name)));
    }

    let asset = state.images.upload(file).await.map_err(|e| {
        tracing::error!("Upload failed: {}", e);
        e
    })?;
    Ok(Json(ApiResponse::success(asset)))
}

/// POST /api/upload/delete
pub async fn delete_upload(
    State(state): State<AppState>,
    Json(req): Json<DeleteUploadRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let public_id = req.public_id.trim();
    if public_id.is_empty() {
        return Err(AppError::BadRequest("publicId is required".to_string()));
    }
    state.images.delete(public_id).await?;
    Ok(Json(ApiResponse::success_msg("deleted")))
}
