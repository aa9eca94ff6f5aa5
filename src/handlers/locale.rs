use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::error::{AppError, AppResult, OptionExt};
use crate::lang::Lang;
use crate::state::AppState;

/// GET /api/locales/:lang
pub async fn get_locale(State(state): State<AppState>, Path(lang): Path<String>) -> AppResult<Json<Value>> {
    let lang: Lang = lang.parse().map_err(AppError::NotFound)?;
    let strings = state
        .locales
        .get(lang)
        .ok_or_not_found(format!("No strings for {}", lang))?;
    Ok(Json(strings.clone()))
}
