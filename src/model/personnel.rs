//! Personnel records
//!
//! Stored documents are loosely typed: `image` may be a bare URL or an
//! object, `subject` may be an array or a comma string, and older rows carry
//! a single `parentId` instead of `parentIds`. Everything is normalized here,
//! when a document becomes a [`PersonnelRecord`], and nowhere else.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::entity::personnel;
use crate::error::AppError;
use crate::lang::Lang;

/// Level given to records created without one
pub const DEFAULT_LEVEL: u32 = 2;

/// Personnel collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Staff,
    Pta,
    Lps,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Staff, Collection::Pta, Collection::Lps];

    /// Collection name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Staff => "staff",
            Collection::Pta => "PTA",
            Collection::Lps => "LPS",
        }
    }

    /// Public page listing this collection
    pub fn public_path(&self) -> &'static str {
        match self {
            Collection::Staff => "/staff",
            Collection::Pta => "/pta",
            Collection::Lps => "/lps",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::NotFound(format!("Unknown collection: {}", s)))
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Collection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Image reference in its one normalized shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(rename = "publicId", default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            public_id: None,
        }
    }

    /// Read either `"https://..."` or `{"url": "...", "public_id": "..."}`.
    /// Empty URLs and any other shape mean "no image".
    pub fn from_value(value: &Value) -> Option<Self> {
        let (url, public_id) = match value {
            Value::String(url) => (url.trim().to_string(), None),
            Value::Object(map) => {
                let url = map.get("url").and_then(Value::as_str)?.trim().to_string();
                let public_id = map
                    .get("public_id")
                    .or_else(|| map.get("publicId"))
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                (url, public_id)
            }
            _ => return None,
        };

        if url.is_empty() {
            return None;
        }
        Some(Self { url, public_id })
    }

    /// Stored form; always the object shape
    pub fn to_value(&self) -> Value {
        match &self.public_id {
            Some(id) => json!({ "url": self.url, "public_id": id }),
            None => json!({ "url": self.url }),
        }
    }
}

/// One staff, PTA or board member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonnelRecord {
    pub id: String,
    pub name: String,
    pub name_zh: Option<String>,
    pub role_ms: String,
    pub role_zh: String,
    pub category: String,
    pub subject: Vec<String>,
    pub level: u32,
    #[serde(rename = "parentIds")]
    pub parent_ids: Vec<String>,
    pub image: Option<ImageRef>,
    pub order: i32,
}

impl PersonnelRecord {
    /// Category tags, trimmed, empty entries skipped
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        split_tags(&self.category)
    }

    pub fn reports_to(&self, id: &str) -> bool {
        self.parent_ids.iter().any(|p| p == id)
    }
}

pub fn split_tags(category: &str) -> impl Iterator<Item = &str> {
    category.split(',').map(str::trim).filter(|t| !t.is_empty())
}

impl From<personnel::Model> for PersonnelRecord {
    fn from(m: personnel::Model) -> Self {
        let parent_ids = normalize_parent_ids(m.parent_ids.as_ref(), m.parent_id.as_deref());
        Self {
            id: m.id,
            name: m.name,
            name_zh: m.name_zh.filter(|s| !s.trim().is_empty()),
            role_ms: m.role_ms,
            role_zh: m.role_zh,
            category: m.category,
            subject: normalize_subjects(m.subject.as_ref()),
            level: u32::try_from(m.level).unwrap_or(0),
            parent_ids,
            image: m.image.as_ref().and_then(ImageRef::from_value),
            order: m.sort_order,
        }
    }
}

/// Level, then order, then name ignoring case, then id
pub fn display_order(a: &PersonnelRecord, b: &PersonnelRecord) -> Ordering {
    a.level
        .cmp(&b.level)
        .then(a.order.cmp(&b.order))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.id.cmp(&b.id))
}

/// `parentIds` wins when present; otherwise a non-empty legacy `parentId`
/// becomes a one-element list.
pub fn normalize_parent_ids(parent_ids: Option<&Value>, legacy: Option<&str>) -> Vec<String> {
    match parent_ids {
        Some(Value::Array(items)) => dedup(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        ),
        _ => legacy
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| vec![s.to_string()])
            .unwrap_or_default(),
    }
}

pub fn normalize_subjects(subject: Option<&Value>) -> Vec<String> {
    match subject {
        Some(Value::Array(items)) => dedup(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        ),
        Some(Value::String(s)) => dedup(split_tags(s).map(str::to_string)),
        _ => Vec::new(),
    }
}

/// Drop repeats, keep first-seen order
pub fn dedup(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Validated input for a new record
#[derive(Debug, Clone, PartialEq)]
pub struct PersonnelDraft {
    pub name: String,
    pub name_zh: Option<String>,
    pub role_ms: String,
    pub role_zh: String,
    pub category: String,
    pub subject: Vec<String>,
    pub level: u32,
    pub parent_ids: Vec<String>,
    pub image: Option<ImageRef>,
    pub order: i32,
}

impl PersonnelDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            name_zh: None,
            role_ms: String::new(),
            role_zh: String::new(),
            category: String::new(),
            subject: Vec::new(),
            level: DEFAULT_LEVEL,
            parent_ids: Vec::new(),
            image: None,
            order: 0,
        }
    }

    pub fn into_model(self, collection: Collection, id: String, now: i64) -> personnel::Model {
        personnel::Model {
            id,
            collection: collection.as_str().to_string(),
            name: self.name,
            name_zh: self.name_zh,
            role_ms: self.role_ms,
            role_zh: self.role_zh,
            category: self.category,
            subject: Some(json!(self.subject)),
            level: i32::try_from(self.level).unwrap_or(i32::MAX),
            parent_ids: Some(json!(self.parent_ids)),
            parent_id: None,
            image: self.image.map(|i| i.to_value()),
            sort_order: self.order,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` leaves a field as stored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonnelPatch {
    pub name: Option<String>,
    /// `Some(None)` clears the Chinese name
    pub name_zh: Option<Option<String>>,
    pub role_ms: Option<String>,
    pub role_zh: Option<String>,
    pub category: Option<String>,
    pub subject: Option<Vec<String>>,
    pub level: Option<u32>,
    pub parent_ids: Option<Vec<String>>,
    /// `Some(None)` removes the image
    pub image: Option<Option<ImageRef>>,
    pub order: Option<i32>,
}

impl PersonnelPatch {
    pub fn parents(parent_ids: Vec<String>) -> Self {
        Self {
            parent_ids: Some(parent_ids),
            ..Default::default()
        }
    }

    pub fn placement(level: u32, order: i32) -> Self {
        Self {
            level: Some(level),
            order: Some(order),
            ..Default::default()
        }
    }

    /// Write the present fields onto a stored document. The legacy
    /// `parent_id` column is left alone.
    pub fn apply(&self, m: &mut personnel::Model, now: i64) {
        if let Some(name) = &self.name {
            m.name = name.clone();
        }
        if let Some(name_zh) = &self.name_zh {
            m.name_zh = name_zh.clone();
        }
        if let Some(role_ms) = &self.role_ms {
            m.role_ms = role_ms.clone();
        }
        if let Some(role_zh) = &self.role_zh {
            m.role_zh = role_zh.clone();
        }
        if let Some(category) = &self.category {
            m.category = category.clone();
        }
        if let Some(subject) = &self.subject {
            m.subject = Some(json!(subject));
        }
        if let Some(level) = self.level {
            m.level = i32::try_from(level).unwrap_or(i32::MAX);
        }
        if let Some(parent_ids) = &self.parent_ids {
            m.parent_ids = Some(json!(parent_ids));
        }
        if let Some(image) = &self.image {
            m.image = image.as_ref().map(ImageRef::to_value);
        }
        if let Some(order) = self.order {
            m.sort_order = order;
        }
        m.updated_at = now;
    }
}

/// Public, single-language view of a record
#[derive(Debug, Clone, Serialize)]
pub struct PersonnelView {
    pub id: String,
    pub name: String,
    pub role: String,
    pub category: String,
    pub subject: Vec<String>,
    pub level: u32,
    #[serde(rename = "parentIds")]
    pub parent_ids: Vec<String>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl PersonnelView {
    pub fn localize(record: &PersonnelRecord, lang: Lang) -> Self {
        Self {
            id: record.id.clone(),
            name: lang.pick(&record.name, record.name_zh.as_deref()).to_string(),
            role: lang.pick(&record.role_ms, Some(record.role_zh.as_str())).to_string(),
            category: record.category.clone(),
            subject: record.subject.clone(),
            level: record.level,
            parent_ids: record.parent_ids.clone(),
            image_url: record.image.as_ref().map(|i| i.url.clone()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Record with just the fields the hierarchy logic reads
    pub fn record(id: &str, name: &str, level: u32) -> PersonnelRecord {
        PersonnelRecord {
            id: id.to_string(),
            name: name.to_string(),
            name_zh: None,
            role_ms: String::new(),
            role_zh: String::new(),
            category: String::new(),
            subject: Vec::new(),
            level,
            parent_ids: Vec::new(),
            image: None,
            order: 0,
        }
    }
}
