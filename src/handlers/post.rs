//! Post handlers: announcements, management, retirement and transfer notices

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::model::{Post, PostForm, PostKind};
use crate::routes::ApiResponse;
use crate::services::PushNotification;
use crate::state::AppState;

/// Characters of the body carried in a push notification
const NOTIFY_BODY_CHARS: usize = 120;

pub(crate) fn kind(name: &str) -> AppResult<PostKind> {
    name.parse()
}

fn detail_path(kind: PostKind, id: &str) -> String {
    format!("{}/{}", kind.public_path(), id)
}

fn revalidate_post(state: &AppState, kind: PostKind, id: &str) {
    state.publisher.revalidate(kind.public_path());
    state.publisher.revalidate(detail_path(kind, id));
}

/// Title, a short body and a link to the post's public page
pub fn notification_for(post: &Post, base_url: &str, topic: &str) -> PushNotification {
    let source = post.subtitle.as_deref().unwrap_or(&post.body);
    let mut body: String = source.chars().take(NOTIFY_BODY_CHARS).collect();
    if source.chars().count() > NOTIFY_BODY_CHARS {
        body.push('…');
    }
    PushNotification {
        title: post.title.clone(),
        body,
        url: format!("{}{}", base_url.trim_end_matches('/'), detail_path(post.kind, &post.id)),
        topic: topic.to_string(),
    }
}

/// GET /api/posts/:kind
pub async fn list_posts(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Post>>>> {
    let kind = kind(&name)?;
    let posts = state.posts.list(kind).await?;
    Ok(Json(ApiResponse::success(posts)))
}

/// POST /api/posts/:kind
pub async fn create_post(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(form): Json<PostForm>,
) -> AppResult<Json<ApiResponse<Post>>> {
    let kind = kind(&name)?;
    let notify = form.notify;
    let draft = form.into_draft(chrono::Local::now().date_naive())?;
    let post = state.posts.create(kind, draft).await.map_err(|e| {
        tracing::error!("Failed to create {}: {}", kind, e);
        e
    })?;

    tracing::info!("Created {} {} ({})", kind, post.id, post.title);
    revalidate_post(&state, kind, &post.id);
    if notify {
        state.publisher.notify(notification_for(
            &post,
            &state.config.site.base_url,
            &state.config.site.notify_topic,
        ));
    }
    Ok(Json(ApiResponse::success(post)))
}

/// PUT /api/posts/:kind/:id
pub async fn update_post(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
    Json(form): Json<PostForm>,
) -> AppResult<Json<ApiResponse<Post>>> {
    let kind = kind(&name)?;
    let patch = form.into_patch()?;
    let post = state.posts.update(kind, &id, patch).await.map_err(|e| {
        tracing::error!("Failed to update {} {}: {}", kind, id, e);
        e
    })?;

    tracing::info!("Updated {} {}", kind, id);
    revalidate_post(&state, kind, &id);
    Ok(Json(ApiResponse::success(post)))
}

/// DELETE /api/posts/:kind/:id
pub async fn delete_post(
    State(state): State<AppState>,
    Path((name, id)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<()>>> {
    let kind = kind(&name)?;
    state.posts.delete(kind, &id).await.map_err(|e| {
        tracing::error!("Failed to delete {} {}: {}", kind, id, e);
        e
    })?;

    tracing::info!("Deleted {} {}", kind, id);
    revalidate_post(&state, kind, &id);
    Ok(Json(ApiResponse::success_msg("deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PostDraft;
    use chrono::NaiveDate;

    #[test]
    fn test_notification_body_is_shortened() {
        let draft = PostDraft {
            title: "Cuti Sekolah".to_string(),
            title_zh: None,
            subtitle: None,
            subtitle_zh: None,
            body: "a".repeat(200),
            body_zh: None,
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            images: Vec::new(),
            attachments: Vec::new(),
        };
        let post = Post::try_from(draft.into_model(PostKind::Announcement, "p9".to_string(), 1)).unwrap();

        let n = notification_for(&post, "https://school.example/", "all");
        assert_eq!(n.url, "https://school.example/announcement/p9");
        assert_eq!(n.body.chars().count(), NOTIFY_BODY_CHARS + 1);
        assert!(n.body.ends_with('…'));
        assert_eq!(n.topic, "all");
    }
}
