//! Tabular list view: search, category filter and pagination over the full
//! in-memory record list

use serde::{Deserialize, Serialize};

use crate::model::personnel::split_tags;
use crate::model::PersonnelRecord;

/// Upper bound on rows per page
pub const MAX_PAGE_SIZE: usize = 100;

/// Query parameters for the admin table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(rename = "pageSize", default)]
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Rows matching the filters, across all pages
    pub total: usize,
    pub page: usize,
    #[serde(rename = "pageSize")]
    pub page_size: usize,
    pub pages: usize,
}

/// Case-insensitive substring match on either name
pub fn matches_search(record: &PersonnelRecord, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record.name.to_lowercase().contains(&needle)
        || record
            .name_zh
            .as_deref()
            .is_some_and(|zh| zh.to_lowercase().contains(&needle))
}

/// Membership in the comma-split tag set; blank or "all" matches everything
pub fn matches_category(record: &PersonnelRecord, category: &str) -> bool {
    let wanted = category.trim();
    if wanted.is_empty() || wanted.eq_ignore_ascii_case("all") {
        return true;
    }
    record.tags().any(|tag| tag.eq_ignore_ascii_case(wanted))
}

/// Filter, then cut out one page. Pages are 1-based; a page past the end is empty.
pub fn list_page(records: &[PersonnelRecord], query: &ListQuery, default_page_size: usize) -> Page<PersonnelRecord> {
    let search = query.search.as_deref().unwrap_or("");
    let category = query.category.as_deref().unwrap_or("");
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(default_page_size)
        .clamp(1, MAX_PAGE_SIZE);

    let filtered: Vec<&PersonnelRecord> = records
        .iter()
        .filter(|r| matches_search(r, search) && matches_category(r, category))
        .collect();

    let total = filtered.len();
    let items = filtered
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect();

    Page {
        items,
        total,
        page,
        page_size,
        pages: total.div_ceil(page_size),
    }
}

/// Distinct tags across all records, for the filter dropdown
pub fn categories(records: &[PersonnelRecord]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in records.iter().flat_map(|r| split_tags(&r.category)) {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            tags.push(tag.to_string());
        }
    }
    tags.sort_by_key(|t| t.to_lowercase());
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::personnel::fixtures::record;

    fn staff(n: usize) -> Vec<PersonnelRecord> {
        (0..n).map(|i| record(&format!("s{}", i), &format!("Guru {}", i), 2)).collect()
    }

    #[test]
    fn test_last_page_holds_the_remainder() {
        let records = staff(15);
        let query = ListQuery {
            page: Some(3),
            page_size: Some(7),
            ..Default::default()
        };
        let page = list_page(&records, &query, 10);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "s14");
        assert_eq!(page.total, 15);
        assert_eq!(page.pages, 3);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let records = staff(3);
        let query = ListQuery {
            page: Some(9),
            ..Default::default()
        };
        let page = list_page(&records, &query, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_page_zero_and_oversized_page_size_are_clamped() {
        let records = staff(5);
        let query = ListQuery {
            page: Some(0),
            page_size: Some(10_000),
            ..Default::default()
        };
        let page = list_page(&records, &query, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn test_search_either_language_ignoring_case() {
        let mut a = record("a", "Cikgu Rahman", 2);
        a.name_zh = Some("拉曼老师".to_string());
        let b = record("b", "Puan Mei Ling", 2);
        let records = vec![a, b];

        let hit = |s: &str| -> Vec<String> {
            let query = ListQuery {
                search: Some(s.to_string()),
                ..Default::default()
            };
            list_page(&records, &query, 10).items.into_iter().map(|r| r.id).collect()
        };

        assert_eq!(hit("RAHMAN"), vec!["a"]);
        assert_eq!(hit("老师"), vec!["a"]);
        assert_eq!(hit("mei"), vec!["b"]);
        assert_eq!(hit("  "), vec!["a", "b"]);
        assert!(hit("zzz").is_empty());
    }

    #[test]
    fn test_category_is_tag_membership() {
        let mut r = record("a", "Cikgu Ah Kow", 2);
        r.category = "Teacher, Admin".to_string();

        assert!(matches_category(&r, "Admin"));
        assert!(matches_category(&r, "teacher"));
        assert!(matches_category(&r, "all"));
        assert!(!matches_category(&r, "Adm"));
        assert!(!matches_category(&r, "Management"));
    }

    #[test]
    fn test_filters_combine() {
        let mut a = record("a", "Cikgu Ali", 2);
        a.category = "Teacher".to_string();
        let mut b = record("b", "Cikgu Abu", 1);
        b.category = "Management, Teacher".to_string();
        let records = vec![a, b];

        let query = ListQuery {
            search: Some("cikgu".to_string()),
            category: Some("Management".to_string()),
            ..Default::default()
        };
        let page = list_page(&records, &query, 10);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, "b");
    }

    #[test]
    fn test_categories_distinct_and_sorted() {
        let mut a = record("a", "A", 2);
        a.category = "Teacher, Admin".to_string();
        let mut b = record("b", "B", 2);
        b.category = "admin,Management,".to_string();
        assert_eq!(categories(&[a, b]), vec!["Admin", "Management", "Teacher"]);
    }
}
