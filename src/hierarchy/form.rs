//! Record edit form
//!
//! The "report to" control offers every other record that is not already
//! selected. It does not look at levels; only the canvas link action does.
//! Saves that leave a parent at the same or a lower level go through, with
//! the offending parents reported back as warnings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::model::personnel::{dedup, normalize_subjects, DEFAULT_LEVEL};
use crate::model::{ImageRef, PersonnelDraft, PersonnelPatch, PersonnelRecord};

/// Form body for create and update. On update, absent fields stay as stored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonnelForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "nameZh")]
    pub name_zh: Option<String>,
    #[serde(default, alias = "roleMs")]
    pub role_ms: Option<String>,
    #[serde(default, alias = "roleZh")]
    pub role_zh: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Array of codes or a comma string
    #[serde(default)]
    pub subject: Option<Value>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default, rename = "parentIds", alias = "parent_ids")]
    pub parent_ids: Option<Vec<String>>,
    /// URL string or `{url, public_id}`; explicit null removes the image
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<Value>>,
    #[serde(default)]
    pub order: Option<i32>,
}

/// Tell an absent field (`None`) from an explicit null (`Some(None)`)
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(Some)
}

/// Column width of names and roles
pub const MAX_NAME_LEN: usize = 128;
/// Column width of the category list
pub const MAX_CATEGORY_LEN: usize = 256;

fn trimmed(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string())
}

fn optional_text(s: Option<String>) -> Option<String> {
    trimmed(s).filter(|s| !s.is_empty())
}

fn bounded(field: &str, s: Option<String>, max: usize) -> AppResult<Option<String>> {
    match s {
        Some(s) if s.chars().count() > max => Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        ))),
        s => Ok(s),
    }
}

fn required_name(name: Option<String>) -> AppResult<String> {
    bounded("name", optional_text(name), MAX_NAME_LEN)?
        .ok_or_else(|| AppError::Validation("name is required".to_string()))
}

fn checked_level(level: Option<u32>) -> AppResult<Option<u32>> {
    match level {
        Some(level) if i32::try_from(level).is_err() => Err(AppError::Validation(format!(
            "level {} is out of range",
            level
        ))),
        level => Ok(level),
    }
}

/// Null or a blank URL means no image; any other unreadable shape is rejected
fn image_ref(image: Option<Value>) -> AppResult<Option<ImageRef>> {
    match image {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(url)) if url.trim().is_empty() => Ok(None),
        Some(value) => ImageRef::from_value(&value)
            .map(Some)
            .ok_or_else(|| AppError::Validation("image must be a URL or {url}".to_string())),
    }
}

fn clean_parents(ids: Vec<String>) -> Vec<String> {
    dedup(ids.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

impl PersonnelForm {
    /// New record: name required, level defaults to 2, no parents unless given
    pub fn into_draft(self) -> AppResult<PersonnelDraft> {
        let name = required_name(self.name)?;
        Ok(PersonnelDraft {
            name,
            name_zh: bounded("name_zh", optional_text(self.name_zh), MAX_NAME_LEN)?,
            role_ms: bounded("role_ms", trimmed(self.role_ms), MAX_NAME_LEN)?.unwrap_or_default(),
            role_zh: bounded("role_zh", trimmed(self.role_zh), MAX_NAME_LEN)?.unwrap_or_default(),
            category: bounded("category", trimmed(self.category), MAX_CATEGORY_LEN)?
                .unwrap_or_default(),
            subject: normalize_subjects(self.subject.as_ref()),
            level: checked_level(self.level)?.unwrap_or(DEFAULT_LEVEL),
            parent_ids: clean_parents(self.parent_ids.unwrap_or_default()),
            image: image_ref(self.image.flatten())?,
            order: self.order.unwrap_or(0),
        })
    }

    /// Edit of record `editing_id`. A record may not report to itself.
    pub fn into_patch(self, editing_id: &str) -> AppResult<PersonnelPatch> {
        let name = match self.name {
            Some(name) => Some(required_name(Some(name))?),
            None => None,
        };

        let parent_ids = self.parent_ids.map(clean_parents);
        if parent_ids
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|id| id == editing_id))
        {
            return Err(AppError::Validation("a record cannot report to itself".to_string()));
        }

        let name_zh = match self.name_zh {
            Some(s) => Some(bounded("name_zh", optional_text(Some(s)), MAX_NAME_LEN)?),
            None => None,
        };
        let image = match self.image {
            Some(img) => Some(image_ref(img)?),
            None => None,
        };

        Ok(PersonnelPatch {
            name,
            name_zh,
            role_ms: bounded("role_ms", trimmed(self.role_ms), MAX_NAME_LEN)?,
            role_zh: bounded("role_zh", trimmed(self.role_zh), MAX_NAME_LEN)?,
            category: bounded("category", trimmed(self.category), MAX_CATEGORY_LEN)?,
            subject: self.subject.as_ref().map(|s| normalize_subjects(Some(s))),
            level: checked_level(self.level)?,
            parent_ids,
            image,
            order: self.order,
        })
    }
}

/// Chips of the "report to" multi-select
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentSelection {
    editing_id: Option<String>,
    ids: Vec<String>,
}

impl ParentSelection {
    pub fn new(editing_id: Option<&str>, ids: Vec<String>) -> Self {
        let mut selection = Self {
            editing_id: editing_id.map(str::to_string),
            ids: Vec::new(),
        };
        for id in ids {
            selection.add(&id);
        }
        selection
    }

    /// Add a chip; duplicates and the record itself are ignored
    pub fn add(&mut self, id: &str) -> bool {
        if self.editing_id.as_deref() == Some(id) || self.ids.iter().any(|p| p == id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|p| p != id);
        self.ids.len() != before
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Dropdown entries: every record except the edited one and the chips
    pub fn options<'a>(&self, records: &'a [PersonnelRecord]) -> Vec<&'a PersonnelRecord> {
        records
            .iter()
            .filter(|r| self.editing_id.as_deref() != Some(r.id.as_str()))
            .filter(|r| !self.ids.contains(&r.id))
            .collect()
    }
}

/// Dropdown entry as sent to the admin panel
#[derive(Debug, Clone, Serialize)]
pub struct ParentOption {
    pub id: String,
    pub name: String,
    pub level: u32,
}

impl From<&PersonnelRecord> for ParentOption {
    fn from(r: &PersonnelRecord) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            level: r.level,
        }
    }
}

pub fn parent_options(
    records: &[PersonnelRecord],
    editing_id: Option<&str>,
    selected: &[String],
) -> Vec<ParentOption> {
    ParentSelection::new(editing_id, selected.to_vec())
        .options(records)
        .into_iter()
        .map(ParentOption::from)
        .collect()
}

/// Parents whose level is not strictly above the record's own. Unknown ids
/// (deleted parents) are not reported.
pub fn level_warnings(record: &PersonnelRecord, records: &[PersonnelRecord]) -> Vec<String> {
    record
        .parent_ids
        .iter()
        .filter(|pid| {
            records
                .iter()
                .find(|r| &r.id == *pid)
                .is_some_and(|parent| parent.level >= record.level)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::personnel::fixtures::record;
    use serde_json::json;

    fn form(body: Value) -> PersonnelForm {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_create_requires_name() {
        assert!(matches!(
            form(json!({ "name": "   " })).into_draft(),
            Err(AppError::Validation(_))
        ));
        assert!(form(json!({})).into_draft().is_err());
    }

    #[test]
    fn test_create_defaults() {
        let draft = form(json!({ "name": " Cikgu Zainab " })).into_draft().unwrap();
        assert_eq!(draft.name, "Cikgu Zainab");
        assert_eq!(draft.level, DEFAULT_LEVEL);
        assert!(draft.parent_ids.is_empty());
        assert!(draft.name_zh.is_none());
    }

    #[test]
    fn test_create_normalizes_inputs() {
        let draft = form(json!({
            "name": "Cikgu Wong",
            "nameZh": "黄老师",
            "subject": "BC, MT, BC",
            "parentIds": ["hm", " hm ", ""],
            "image": "https://img.example/w.png"
        }))
        .into_draft()
        .unwrap();
        assert_eq!(draft.name_zh.as_deref(), Some("黄老师"));
        assert_eq!(draft.subject, vec!["BC", "MT"]);
        assert_eq!(draft.parent_ids, vec!["hm"]);
        assert_eq!(draft.image, Some(ImageRef::new("https://img.example/w.png")));
    }

    #[test]
    fn test_patch_rejects_self_parent() {
        let err = form(json!({ "parentIds": ["me", "hm"] })).into_patch("me");
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_patch_absent_fields_stay_none() {
        let patch = form(json!({ "level": 1 })).into_patch("x").unwrap();
        assert_eq!(patch.level, Some(1));
        assert!(patch.name.is_none());
        assert!(patch.image.is_none());
        assert!(patch.parent_ids.is_none());
    }

    #[test]
    fn test_patch_null_image_clears_and_blank_zh_clears() {
        let patch = form(json!({ "image": null, "name_zh": "" })).into_patch("x").unwrap();
        assert_eq!(patch.image, Some(None));
        assert_eq!(patch.name_zh, Some(None));
    }

    #[test]
    fn test_level_out_of_range_rejected() {
        let body = json!({"name": "Junior", "level": 3000000000u64});
        assert!(matches!(form(body.clone()).into_draft(), Err(AppError::Validation(_))));
        assert!(matches!(form(body).into_patch("me"), Err(AppError::Validation(_))));

        let top = form(json!({"name": "Junior", "level": i32::MAX})).into_draft().unwrap();
        assert_eq!(top.level, i32::MAX as u32);
    }

    #[test]
    fn test_unreadable_image_rejected() {
        for image in [json!({"src": "x"}), json!(42), json!({"url": ""})] {
            let err = form(json!({"image": image.clone()})).into_patch("me");
            assert!(matches!(err, Err(AppError::Validation(_))), "{}", image);
            let err = form(json!({"name": "Ali", "image": image})).into_draft();
            assert!(matches!(err, Err(AppError::Validation(_))));
        }
        let patch = form(json!({"image": {"url": "https://img/a.png"}})).into_patch("me").unwrap();
        assert!(matches!(patch.image, Some(Some(_))));
        let patch = form(json!({"image": "  "})).into_patch("me").unwrap();
        assert_eq!(patch.image, Some(None));
    }

    #[test]
    fn test_text_lengths_follow_columns() {
        let long = "a".repeat(MAX_NAME_LEN + 1);
        for field in ["name", "name_zh", "role_ms", "role_zh"] {
            let mut body = json!({"name": "Ali"});
            body[field] = json!(long);
            assert!(matches!(form(body.clone()).into_draft(), Err(AppError::Validation(_))), "{}", field);
            assert!(matches!(form(body).into_patch("me"), Err(AppError::Validation(_))), "{}", field);
        }
        // counted in characters, not bytes
        let zh = "校".repeat(MAX_NAME_LEN);
        let draft = form(json!({"name": "Ali", "name_zh": zh})).into_draft().unwrap();
        assert_eq!(draft.name_zh.map(|s| s.chars().count()), Some(MAX_NAME_LEN));

        let category = "x".repeat(MAX_CATEGORY_LEN + 1);
        let err = form(json!({"name": "Ali", "category": category})).into_draft();
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_options_exclude_self_and_selected_but_not_by_level() {
        let records = vec![
            record("hm", "Guru Besar", 0),
            record("pk", "PK", 1),
            record("me", "Cikgu", 2),
            record("junior", "Guru Muda", 3),
        ];
        let ids: Vec<String> = parent_options(&records, Some("me"), &["pk".to_string()])
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec!["hm", "junior"]);
    }

    #[test]
    fn test_selection_chips() {
        let mut sel = ParentSelection::new(Some("me"), vec!["a".to_string(), "a".to_string()]);
        assert_eq!(sel.ids(), ["a".to_string()]);
        assert!(!sel.add("me"));
        assert!(!sel.add("a"));
        assert!(sel.add("b"));
        assert!(sel.remove("a"));
        assert!(!sel.remove("a"));
        assert_eq!(sel.ids(), ["b".to_string()]);
    }

    #[test]
    fn test_level_warnings_flag_inverted_parents() {
        let mut me = record("me", "Cikgu", 1);
        me.parent_ids = vec!["hm".to_string(), "peer".to_string(), "junior".to_string(), "gone".to_string()];
        let records = vec![
            record("hm", "Guru Besar", 0),
            record("peer", "Rakan", 1),
            record("junior", "Guru Muda", 2),
            me.clone(),
        ];
        assert_eq!(level_warnings(&me, &records), vec!["peer", "junior"]);
    }
}
