//! Posts: announcements, management bulletins, retirement profiles and transfer notices

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use super::personnel::ImageRef;
use crate::entity::post;
use crate::error::AppError;
use crate::lang::Lang;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostKind {
    Announcement,
    Management,
    /// Retirement profiles
    Persaraan,
    /// Transfer notices
    Pertukaran,
}

impl PostKind {
    pub const ALL: [PostKind; 4] = [
        PostKind::Announcement,
        PostKind::Management,
        PostKind::Persaraan,
        PostKind::Pertukaran,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Announcement => "announcement",
            PostKind::Management => "management",
            PostKind::Persaraan => "persaraan",
            PostKind::Pertukaran => "pertukaran",
        }
    }

    /// Public listing page; detail pages live under it
    pub fn public_path(&self) -> String {
        format!("/{}", self.as_str())
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::NotFound(format!("Unknown post kind: {}", s)))
    }
}

impl Serialize for PostKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PostKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Downloadable file attached to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
    #[serde(rename = "publicId", default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

impl Attachment {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(url) if !url.trim().is_empty() => Some(Self {
                name: file_name(url),
                url: url.trim().to_string(),
                public_id: None,
            }),
            Value::Object(map) => {
                let url = map.get("url").and_then(Value::as_str)?.trim();
                if url.is_empty() {
                    return None;
                }
                let name = map
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| file_name(url));
                let public_id = map
                    .get("public_id")
                    .or_else(|| map.get("publicId"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Some(Self {
                    name,
                    url: url.to_string(),
                    public_id,
                })
            }
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        json!({ "name": self.name, "url": self.url, "public_id": self.public_id })
    }
}

fn file_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: String,
    pub kind: PostKind,
    pub title: String,
    pub title_zh: Option<String>,
    pub subtitle: Option<String>,
    pub subtitle_zh: Option<String>,
    pub body: String,
    pub body_zh: Option<String>,
    pub date: NaiveDate,
    pub images: Vec<ImageRef>,
    pub attachments: Vec<Attachment>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl TryFrom<post::Model> for Post {
    type Error = AppError;

    fn try_from(m: post::Model) -> Result<Self, Self::Error> {
        let kind = m.kind.parse::<PostKind>().map_err(|_| {
            AppError::Internal(format!("post {} has unknown kind '{}'", m.id, m.kind))
        })?;
        Ok(Self {
            id: m.id,
            kind,
            title: m.title,
            title_zh: non_blank(m.title_zh),
            subtitle: non_blank(m.subtitle),
            subtitle_zh: non_blank(m.subtitle_zh),
            body: m.body,
            body_zh: non_blank(m.body_zh),
            date: m.date,
            images: list_of(m.images.as_ref(), ImageRef::from_value),
            attachments: list_of(m.attachments.as_ref(), Attachment::from_value),
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// A single value where a list is expected is read as a one-element list
fn list_of<T>(value: Option<&Value>, read: impl Fn(&Value) -> Option<T>) -> Vec<T> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(&read).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => read(single).into_iter().collect(),
    }
}

/// Validated input for a new post
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub title_zh: Option<String>,
    pub subtitle: Option<String>,
    pub subtitle_zh: Option<String>,
    pub body: String,
    pub body_zh: Option<String>,
    pub date: NaiveDate,
    pub images: Vec<ImageRef>,
    pub attachments: Vec<Attachment>,
}

impl PostDraft {
    pub fn into_model(self, kind: PostKind, id: String, now: i64) -> post::Model {
        post::Model {
            id,
            kind: kind.as_str().to_string(),
            title: self.title,
            title_zh: self.title_zh,
            subtitle: self.subtitle,
            subtitle_zh: self.subtitle_zh,
            body: self.body,
            body_zh: self.body_zh,
            date: self.date,
            images: Some(images_value(&self.images)),
            attachments: Some(attachments_value(&self.attachments)),
            created_at: now,
            updated_at: now,
        }
    }
}

fn images_value(images: &[ImageRef]) -> Value {
    Value::Array(images.iter().map(ImageRef::to_value).collect())
}

fn attachments_value(attachments: &[Attachment]) -> Value {
    Value::Array(attachments.iter().map(Attachment::to_value).collect())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub title_zh: Option<Option<String>>,
    pub subtitle: Option<Option<String>>,
    pub subtitle_zh: Option<Option<String>>,
    pub body: Option<String>,
    pub body_zh: Option<Option<String>>,
    pub date: Option<NaiveDate>,
    pub images: Option<Vec<ImageRef>>,
    pub attachments: Option<Vec<Attachment>>,
}

impl PostPatch {
    pub fn apply(&self, m: &mut post::Model, now: i64) {
        if let Some(title) = &self.title {
            m.title = title.clone();
        }
        if let Some(title_zh) = &self.title_zh {
            m.title_zh = title_zh.clone();
        }
        if let Some(subtitle) = &self.subtitle {
            m.subtitle = subtitle.clone();
        }
        if let Some(subtitle_zh) = &self.subtitle_zh {
            m.subtitle_zh = subtitle_zh.clone();
        }
        if let Some(body) = &self.body {
            m.body = body.clone();
        }
        if let Some(body_zh) = &self.body_zh {
            m.body_zh = body_zh.clone();
        }
        if let Some(date) = self.date {
            m.date = date;
        }
        if let Some(images) = &self.images {
            m.images = Some(images_value(images));
        }
        if let Some(attachments) = &self.attachments {
            m.attachments = Some(attachments_value(attachments));
        }
        m.updated_at = now;
    }
}

/// Post body for create and update. On update, absent fields stay as stored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "titleZh")]
    pub title_zh: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default, alias = "subtitleZh")]
    pub subtitle_zh: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, alias = "bodyZh")]
    pub body_zh: Option<String>,
    /// `YYYY-MM-DD`; today when a new post names none
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub images: Option<Value>,
    #[serde(default)]
    pub attachments: Option<Value>,
    /// Send a push notification once the post is saved
    #[serde(default)]
    pub notify: bool,
}

fn text(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl PostForm {
    pub fn into_draft(self, today: NaiveDate) -> Result<PostDraft, AppError> {
        let title = text(self.title).ok_or_else(|| AppError::Validation("title is required".to_string()))?;
        Ok(PostDraft {
            title,
            title_zh: text(self.title_zh),
            subtitle: text(self.subtitle),
            subtitle_zh: text(self.subtitle_zh),
            body: self.body.map(|b| b.trim().to_string()).unwrap_or_default(),
            body_zh: text(self.body_zh),
            date: self.date.unwrap_or(today),
            images: list_of(self.images.as_ref(), ImageRef::from_value),
            attachments: list_of(self.attachments.as_ref(), Attachment::from_value),
        })
    }

    /// A blank translated field clears it; a blank title is rejected
    pub fn into_patch(self) -> Result<PostPatch, AppError> {
        let title = match self.title {
            Some(t) => Some(text(Some(t)).ok_or_else(|| AppError::Validation("title is required".to_string()))?),
            None => None,
        };
        Ok(PostPatch {
            title,
            title_zh: self.title_zh.map(|s| text(Some(s))),
            subtitle: self.subtitle.map(|s| text(Some(s))),
            subtitle_zh: self.subtitle_zh.map(|s| text(Some(s))),
            body: self.body.map(|b| b.trim().to_string()),
            body_zh: self.body_zh.map(|s| text(Some(s))),
            date: self.date,
            images: self.images.as_ref().map(|v| list_of(Some(v), ImageRef::from_value)),
            attachments: self.attachments.as_ref().map(|v| list_of(Some(v), Attachment::from_value)),
        })
    }
}

/// Public, single-language view of a post
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub kind: PostKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub body: String,
    pub date: NaiveDate,
    pub images: Vec<String>,
    pub attachments: Vec<Attachment>,
}

impl PostView {
    pub fn localize(post: &Post, lang: Lang) -> Self {
        let subtitle = match (&post.subtitle, &post.subtitle_zh) {
            (Some(ms), zh) => Some(lang.pick(ms, zh.as_deref()).to_string()),
            (None, Some(zh)) if lang == Lang::Zh => Some(zh.clone()),
            _ => None,
        };
        Self {
            id: post.id.clone(),
            kind: post.kind,
            title: lang.pick(&post.title, post.title_zh.as_deref()).to_string(),
            subtitle,
            body: lang.pick(&post.body, post.body_zh.as_deref()).to_string(),
            date: post.date,
            images: post.images.iter().map(|i| i.url.clone()).collect(),
            attachments: post.attachments.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PostDraft {
        PostDraft {
            title: "Hari Sukan".to_string(),
            title_zh: Some("运动会".to_string()),
            subtitle: None,
            subtitle_zh: None,
            body: "Hari sukan tahunan.".to_string(),
            body_zh: None,
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            images: vec![ImageRef::new("https://img.example/sukan.jpg")],
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!("Persaraan".parse::<PostKind>().unwrap(), PostKind::Persaraan);
        assert!("news".parse::<PostKind>().is_err());
        assert_eq!(PostKind::Pertukaran.public_path(), "/pertukaran");
    }

    #[test]
    fn test_mixed_image_shapes_are_normalized() {
        let mut m = draft().into_model(PostKind::Announcement, "p1".to_string(), 1);
        m.images = Some(json!([
            "https://img.example/a.jpg",
            { "url": "https://img.example/b.jpg", "public_id": "posts/b" },
            { "caption": "no url" }
        ]));
        let post = Post::try_from(m).unwrap();
        assert_eq!(post.images.len(), 2);
        assert_eq!(post.images[1].public_id.as_deref(), Some("posts/b"));
    }

    #[test]
    fn test_single_attachment_reads_as_list() {
        let mut m = draft().into_model(PostKind::Management, "p1".to_string(), 1);
        m.attachments = Some(json!("https://files.example/minit-mesyuarat.pdf"));
        let post = Post::try_from(m).unwrap();
        assert_eq!(post.attachments.len(), 1);
        assert_eq!(post.attachments[0].name, "minit-mesyuarat.pdf");
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let mut m = draft().into_model(PostKind::Announcement, "p1".to_string(), 1);
        m.kind = "memo".to_string();
        assert!(Post::try_from(m).is_err());
    }

    #[test]
    fn test_localized_view() {
        let post = Post::try_from(draft().into_model(PostKind::Announcement, "p1".to_string(), 1)).unwrap();
        let zh = PostView::localize(&post, Lang::Zh);
        assert_eq!(zh.title, "运动会");
        assert_eq!(zh.body, "Hari sukan tahunan.");
        assert_eq!(zh.images, vec!["https://img.example/sukan.jpg".to_string()]);
    }

    #[test]
    fn test_form_draft_defaults_date_and_requires_title() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let form: PostForm = serde_json::from_value(json!({
            "title": "  Mesyuarat PIBG ",
            "attachments": [{ "name": "Agenda", "url": "https://files.example/agenda.pdf" }],
            "notify": true
        }))
        .unwrap();
        assert!(form.notify);
        let draft = form.into_draft(today).unwrap();
        assert_eq!(draft.title, "Mesyuarat PIBG");
        assert_eq!(draft.date, today);
        assert_eq!(draft.attachments[0].name, "Agenda");

        let blank: PostForm = serde_json::from_value(json!({ "title": " " })).unwrap();
        assert!(matches!(blank.into_draft(today), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_form_patch_clears_blank_translation() {
        let form: PostForm = serde_json::from_value(json!({ "titleZh": "", "date": "2026-01-02" })).unwrap();
        let patch = form.into_patch().unwrap();
        assert_eq!(patch.title, None);
        assert_eq!(patch.title_zh, Some(None));
        assert_eq!(patch.date, NaiveDate::from_ymd_opt(2026, 1, 2));

        let mut m = draft().into_model(PostKind::Announcement, "p1".to_string(), 1);
        patch.apply(&mut m, 5);
        assert_eq!(m.title_zh, None);
        assert_eq!(m.title, "Hari Sukan");
        assert_eq!(m.updated_at, 5);
    }
}
