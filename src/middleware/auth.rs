//! Authentication middleware
//!
//! Admin routes need a session opened with a verified identity token

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower_sessions::Session;

use crate::identity::AdminIdentity;

/// Session key for the signed-in administrator
pub const SESSION_ADMIN_KEY: &str = "admin";
pub const SESSION_TIMESTAMP_KEY: &str = "timestamp";

/// Extension holding the administrator behind the current request
#[derive(Clone, Debug)]
pub struct CurrentAdmin(pub AdminIdentity);

impl std::ops::Deref for CurrentAdmin {
    type Target = AdminIdentity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Paths that don't require authentication
fn is_public_path(path: &str) -> bool {
    // Everything outside /api is the static admin panel
    if !path.starts_with("/api") {
        return true;
    }

    if path == "/api/health" || path == "/api/config" || path == "/api/auth/session" {
        return true;
    }
    // Read-only site content and UI strings
    path.starts_with("/api/public/") || path.starts_with("/api/locales/")
}

pub async fn auth_layer(
    session: Session,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if is_public_path(&path) {
        return next.run(request).await;
    }

    let admin: Option<AdminIdentity> = match session.get(SESSION_ADMIN_KEY).await {
        Ok(admin) => admin,
        Err(e) => {
            tracing::error!("Session read failed: {}", e);
            None
        }
    };

    let Some(admin) = admin else {
        tracing::debug!("Rejected unauthenticated request to {}", path);
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": 401, "message": "Unauthorized"})),
        )
            .into_response();
    };

    request.extensions_mut().insert(CurrentAdmin(admin));
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/"));
        assert!(is_public_path("/assets/index.js"));
        assert!(is_public_path("/api/health"));
        assert!(is_public_path("/api/auth/session"));
        assert!(is_public_path("/api/public/personnel/staff"));
        assert!(is_public_path("/api/locales/zh"));

        assert!(!is_public_path("/api/auth/me"));
        assert!(!is_public_path("/api/auth/logout"));
        assert!(!is_public_path("/api/personnel/staff"));
        assert!(!is_public_path("/api/upload"));
        assert!(!is_public_path("/api/publicity"));
    }
}
