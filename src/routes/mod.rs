use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::handlers;
use crate::middleware::auth_layer;
use crate::state::AppState;

pub mod health;

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: true,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: false,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn success_msg(message: impl Into<String>) -> Self {
        Self {
            code: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    // Sessions live in memory; a restart signs every admin out
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.config.auth.secure_cookie)
        .with_http_only(true);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/config", get(handlers::config::get_config))
        .route("/locales/:lang", get(handlers::locale::get_locale))
        // Auth routes
        .route("/auth/session", post(handlers::auth::open_session))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        // Personnel routes
        .route(
            "/personnel/:collection",
            get(handlers::personnel::list_records).post(handlers::personnel::create_record),
        )
        .route("/personnel/:collection/all", get(handlers::personnel::all_records))
        .route("/personnel/:collection/categories", get(handlers::personnel::list_categories))
        .route("/personnel/:collection/parent-options", get(handlers::personnel::parent_options))
        .route(
            "/personnel/:collection/:id",
            put(handlers::personnel::update_record).delete(handlers::personnel::delete_record),
        )
        // Hierarchy canvas
        .route("/personnel/:collection/link", post(handlers::canvas::link))
        .route("/personnel/:collection/unlink", post(handlers::canvas::unlink_records))
        .route("/personnel/:collection/move", post(handlers::canvas::move_record))
        .route("/personnel/:collection/chart", get(handlers::canvas::chart))
        // Post routes
        .route(
            "/posts/:kind",
            get(handlers::post::list_posts).post(handlers::post::create_post),
        )
        .route(
            "/posts/:kind/:id",
            put(handlers::post::update_post).delete(handlers::post::delete_post),
        )
        // Upload proxy
        .route(
            "/upload",
            post(handlers::upload::upload)
                .layer(DefaultBodyLimit::max(state.config.upload.max_upload_size)),
        )
        .route("/upload/delete", post(handlers::upload::delete_upload))
        // Public site content
        .route("/public/personnel/:collection", get(handlers::public::personnel))
        .route("/public/personnel/:collection/chart.svg", get(handlers::public::chart_svg))
        .route("/public/posts/:kind", get(handlers::public::posts))
        .route("/public/posts/:kind/:id", get(handlers::public::post))
        .fallback(fallback);

    // Static file service for the admin panel
    // Falls back to index.html for SPA routing
    let static_dir = &state.config.static_dir;
    let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(auth_layer))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Fallback handler for 404
pub async fn fallback() -> (StatusCode, Json<ApiResponse<()>>) {
    (StatusCode::NOT_FOUND, Json(ApiResponse::error("Not Found")))
}
