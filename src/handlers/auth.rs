//! Admin session handlers
//!
//! The admin panel signs in with the identity provider and hands the ID
//! token over once; the server session carries the identity afterwards.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, AppResult};
use crate::identity::AdminIdentity;
use crate::middleware::auth::{CurrentAdmin, SESSION_ADMIN_KEY, SESSION_TIMESTAMP_KEY};
use crate::routes::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    #[serde(rename = "idToken", alias = "id_token")]
    pub id_token: String,
}

/// POST /api/auth/session
pub async fn open_session(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<SessionRequest>,
) -> AppResult<Json<ApiResponse<AdminIdentity>>> {
    if req.id_token.trim().is_empty() {
        return Err(AppError::BadRequest("idToken is required".to_string()));
    }

    let admin = state.identity.verify(req.id_token.trim())?;

    session
        .insert(SESSION_ADMIN_KEY, &admin)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if let Err(e) = session.insert(SESSION_TIMESTAMP_KEY, chrono::Utc::now().timestamp()).await {
        tracing::error!("Failed to save session timestamp: {}", e);
    }

    tracing::info!("Admin signed in: {}", admin.email);
    Ok(Json(ApiResponse::success(admin)))
}

/// POST /api/auth/logout
pub async fn logout(
    session: Session,
    Extension(admin): Extension<CurrentAdmin>,
) -> AppResult<Json<ApiResponse<()>>> {
    session.flush().await.map_err(|e| {
        tracing::error!("Failed to flush session: {}", e);
        AppError::Internal(e.to_string())
    })?;

    tracing::info!("Admin signed out: {}", admin.email);
    Ok(Json(ApiResponse::success_msg("logout success")))
}

/// GET /api/auth/me
pub async fn me(Extension(admin): Extension<CurrentAdmin>) -> Json<ApiResponse<AdminIdentity>> {
    Json(ApiResponse::success(admin.0))
}
