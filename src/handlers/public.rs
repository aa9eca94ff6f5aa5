//! Read-only content for the public site, in the visitor's language

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};

use super::personnel::collection;
use super::post::kind;
use crate::error::AppResult;
use crate::hierarchy;
use crate::lang::Lang;
use crate::model::{PersonnelView, PostView};
use crate::routes::ApiResponse;
use crate::state::AppState;

/// GET /api/public/personnel/:collection
pub async fn personnel(
    State(state): State<AppState>,
    lang: Lang,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<PersonnelView>>>> {
    let collection = collection(&name)?;
    let records = state.personnel.list(collection).await?;
    let views = records.iter().map(|r| PersonnelView::localize(r, lang)).collect();
    Ok(Json(ApiResponse::success(views)))
}

/// GET /api/public/personnel/:collection/chart.svg
pub async fn chart_svg(
    State(state): State<AppState>,
    lang: Lang,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let collection = collection(&name)?;
    let mut records = state.personnel.list(collection).await?;
    for record in &mut records {
        let view = PersonnelView::localize(record, lang);
        record.name = view.name;
        record.role_ms = view.role;
    }
    let svg = hierarchy::render_svg(&hierarchy::chart_layout(&records));
    Ok(([(header::CONTENT_TYPE, "image/svg+xml; charset=utf-8")], svg))
}

/// GET /api/public/posts/:kind
pub async fn posts(
    State(state): State<AppState>,
    lang: Lang,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<PostView>>>> {
    let kind = kind(&name)?;
    let posts = state.posts.list(kind).await?;
    let views = posts.iter().map(|p| PostView::localize(p, lang)).collect();
    Ok(Json(ApiResponse::success(views)))
}

/// GET /api/public/posts/:kind/:id
pub async fn post(
    State(state): State<AppState>,
    lang: Lang,
    Path((name, id)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<PostView>>> {
    let kind = kind(&name)?;
    let post = state.posts.get(kind, &id).await?;
    Ok(Json(ApiResponse::success(PostView::localize(&post, lang))))
}
