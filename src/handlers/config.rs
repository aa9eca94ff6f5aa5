//! Configuration handlers
//!
//! Returns public configuration settings to the frontend

use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::hierarchy::listing::MAX_PAGE_SIZE;
use crate::lang::Lang;
use crate::state::AppState;

/// Public configuration response
#[derive(Debug, Serialize)]
pub struct PublicConfig {
    /// Maximum upload file size in bytes
    #[serde(rename = "maxUploadSize")]
    pub max_upload_size: usize,
    #[serde(rename = "pageSize")]
    pub page_size: usize,
    #[serde(rename = "maxPageSize")]
    pub max_page_size: usize,
    pub languages: Vec<Lang>,
    #[serde(rename = "defaultLang")]
    pub default_lang: Lang,
}

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(PublicConfig {
        max_upload_size: state.config.upload.max_upload_size,
        page_size: state.config.listing.page_size,
        max_page_size: MAX_PAGE_SIZE,
        languages: Lang::ALL.to_vec(),
        default_lang: state.default_lang,
    })
}
