//! Visual hierarchy canvas
//!
//! Linking is a two-state machine held in one value. Transitions consume the
//! state and hand back the next one; nothing here touches the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AppError, AppResult};
use crate::model::PersonnelRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LinkState {
    #[default]
    Idle,
    /// Pointer is down on `source_id`'s link handle; a dashed line follows `cursor`
    Connecting { source_id: String, cursor: Point },
}

/// Why a release over a card did not link
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkRejection {
    #[error("'{child}' (level {child_level}) must sit below '{parent}' (level {parent_level})")]
    LevelOrder {
        parent: String,
        parent_level: u32,
        child: String,
        child_level: u32,
    },
    #[error("source record {0} no longer exists")]
    UnknownSource(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    /// Persist `parent_ids` on `child_id`
    Link {
        child_id: String,
        parent_ids: Vec<String>,
    },
    /// The link exists already; nothing to write
    AlreadyLinked,
    Rejected(LinkRejection),
    /// Released over empty space or the source itself
    Discarded,
}

impl LinkState {
    /// Pointer down on a card's link handle. Starting again while connecting
    /// replaces the previous source.
    pub fn begin(self, source_id: impl Into<String>, at: Point) -> Self {
        LinkState::Connecting {
            source_id: source_id.into(),
            cursor: at,
        }
    }

    pub fn pointer_moved(self, pos: Point) -> Self {
        match self {
            LinkState::Connecting { source_id, .. } => LinkState::Connecting { source_id, cursor: pos },
            LinkState::Idle => LinkState::Idle,
        }
    }

    /// Pointer up. `target` is the card under the pointer, if any. Always
    /// returns to `Idle`.
    pub fn release(self, target: Option<&PersonnelRecord>, records: &[PersonnelRecord]) -> (Self, LinkOutcome) {
        let LinkState::Connecting { source_id, .. } = self else {
            return (LinkState::Idle, LinkOutcome::Discarded);
        };
        let Some(target) = target else {
            return (LinkState::Idle, LinkOutcome::Discarded);
        };
        if target.id == source_id {
            return (LinkState::Idle, LinkOutcome::Discarded);
        }
        let Some(source) = records.iter().find(|r| r.id == source_id) else {
            return (LinkState::Idle, LinkOutcome::Rejected(LinkRejection::UnknownSource(source_id)));
        };

        (LinkState::Idle, link_outcome(source, target))
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, LinkState::Connecting { .. })
    }
}

/// `source` becomes a parent of `target` when it is strictly more senior
pub fn link_outcome(source: &PersonnelRecord, target: &PersonnelRecord) -> LinkOutcome {
    if target.level <= source.level {
        return LinkOutcome::Rejected(LinkRejection::LevelOrder {
            parent: source.name.clone(),
            parent_level: source.level,
            child: target.name.clone(),
            child_level: target.level,
        });
    }
    if target.reports_to(&source.id) {
        return LinkOutcome::AlreadyLinked;
    }

    let mut parent_ids = target.parent_ids.clone();
    parent_ids.push(source.id.clone());
    LinkOutcome::Link {
        child_id: target.id.clone(),
        parent_ids,
    }
}

/// Parent list of `child` with `parent_id` removed, or `None` when it was not there
pub fn unlink(child: &PersonnelRecord, parent_id: &str) -> Option<Vec<String>> {
    if !child.reports_to(parent_id) {
        return None;
    }
    Some(
        child
            .parent_ids
            .iter()
            .filter(|p| p.as_str() != parent_id)
            .cloned()
            .collect(),
    )
}

/// Horizontal extent of a card as measured on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiblingCard {
    pub id: String,
    pub left: f64,
    pub width: f64,
}

impl SiblingCard {
    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

/// Slot for a dropped card: how many siblings have their center left of the
/// cursor. The dragged card itself is not counted.
pub fn insertion_index(cursor_x: f64, dragged_id: &str, siblings: &[SiblingCard]) -> usize {
    siblings
        .iter()
        .filter(|s| s.id != dragged_id)
        .filter(|s| s.center_x() < cursor_x)
        .count()
}

/// Drop of a card into a level container
#[derive(Debug, Clone, Deserialize)]
pub struct DropRequest {
    pub id: String,
    pub level: u32,
    /// Slot chosen by the client; wins over cursor geometry
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(rename = "cursorX", default)]
    pub cursor_x: Option<f64>,
    #[serde(default)]
    pub siblings: Vec<SiblingCard>,
}

/// Level and order to write for a drop, in one update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub level: u32,
    pub order: i32,
}

impl DropRequest {
    /// With neither an index nor a cursor position the card goes last.
    /// Levels must fit the stored column.
    pub fn placement(&self) -> AppResult<Placement> {
        if i32::try_from(self.level).is_err() {
            return Err(AppError::Validation(format!("level {} is out of range", self.level)));
        }
        let index = match (self.index, self.cursor_x) {
            (Some(index), _) => index,
            (None, Some(x)) => insertion_index(x, &self.id, &self.siblings),
            (None, None) => self.siblings.iter().filter(|s| s.id != self.id).count(),
        };
        Ok(Placement {
            level: self.level,
            order: i32::try_from(index).unwrap_or(i32::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::personnel::fixtures::record;

    fn org() -> Vec<PersonnelRecord> {
        vec![
            record("hm", "Guru Besar", 0),
            record("pk", "PK Pentadbiran", 1),
            record("guru", "Cikgu Aisyah", 2),
        ]
    }

    fn drag(records: &[PersonnelRecord], from: &str, to: Option<&str>) -> LinkOutcome {
        let state = LinkState::Idle
            .begin(from, Point::new(10.0, 10.0))
            .pointer_moved(Point::new(40.0, 90.0));
        assert!(state.is_connecting());
        let target = to.and_then(|id| records.iter().find(|r| r.id == id));
        let (next, outcome) = state.release(target, records);
        assert_eq!(next, LinkState::Idle);
        outcome
    }

    #[test]
    fn test_link_senior_to_junior() {
        let records = org();
        assert_eq!(
            drag(&records, "pk", Some("guru")),
            LinkOutcome::Link {
                child_id: "guru".to_string(),
                parent_ids: vec!["pk".to_string()],
            }
        );
    }

    #[test]
    fn test_link_junior_to_senior_is_rejected() {
        let records = org();
        assert!(matches!(
            drag(&records, "pk", Some("hm")),
            LinkOutcome::Rejected(LinkRejection::LevelOrder { parent_level: 1, child_level: 0, .. })
        ));
    }

    #[test]
    fn test_link_same_level_is_rejected() {
        let mut records = org();
        records.push(record("guru2", "Cikgu Ravi", 2));
        assert!(matches!(
            drag(&records, "guru", Some("guru2")),
            LinkOutcome::Rejected(LinkRejection::LevelOrder { .. })
        ));
    }

    #[test]
    fn test_release_over_nothing_or_self_is_discarded() {
        let records = org();
        assert_eq!(drag(&records, "hm", None), LinkOutcome::Discarded);
        assert_eq!(drag(&records, "hm", Some("hm")), LinkOutcome::Discarded);
    }

    #[test]
    fn test_existing_link_is_not_duplicated() {
        let mut records = org();
        records[2].parent_ids = vec!["pk".to_string()];
        assert_eq!(drag(&records, "pk", Some("guru")), LinkOutcome::AlreadyLinked);
    }

    #[test]
    fn test_link_appends_to_existing_parents() {
        let mut records = org();
        records[2].parent_ids = vec!["pk".to_string()];
        assert_eq!(
            drag(&records, "hm", Some("guru")),
            LinkOutcome::Link {
                child_id: "guru".to_string(),
                parent_ids: vec!["pk".to_string(), "hm".to_string()],
            }
        );
    }

    #[test]
    fn test_vanished_source_is_rejected() {
        let records = org();
        let target = records[2].clone();
        let (_, outcome) = LinkState::Idle
            .begin("deleted", Point::default())
            .release(Some(&target), &records);
        assert!(matches!(outcome, LinkOutcome::Rejected(LinkRejection::UnknownSource(_))));
    }

    #[test]
    fn test_idle_ignores_move_and_release() {
        let records = org();
        let state = LinkState::Idle.pointer_moved(Point::new(1.0, 1.0));
        assert_eq!(state, LinkState::Idle);
        let (state, outcome) = state.release(records.first(), &records);
        assert_eq!(state, LinkState::Idle);
        assert_eq!(outcome, LinkOutcome::Discarded);
    }

    #[test]
    fn test_unlink() {
        let mut child = record("c", "Cikgu", 2);
        child.parent_ids = vec!["a".to_string(), "b".to_string()];
        assert_eq!(unlink(&child, "a"), Some(vec!["b".to_string()]));
        assert_eq!(unlink(&child, "z"), None);
    }

    fn card(id: &str, left: f64) -> SiblingCard {
        SiblingCard {
            id: id.to_string(),
            left,
            width: 100.0,
        }
    }

    #[test]
    fn test_insertion_index_from_cursor() {
        let siblings = vec![card("a", 0.0), card("b", 120.0), card("c", 240.0)];
        assert_eq!(insertion_index(10.0, "x", &siblings), 0);
        assert_eq!(insertion_index(60.0, "x", &siblings), 1);
        assert_eq!(insertion_index(200.0, "x", &siblings), 2);
        assert_eq!(insertion_index(999.0, "x", &siblings), 3);
        // dragging "a" within its own row
        assert_eq!(insertion_index(999.0, "a", &siblings), 2);
    }

    #[test]
    fn test_drop_placement() {
        let drop = DropRequest {
            id: "x".to_string(),
            level: 1,
            index: None,
            cursor_x: Some(200.0),
            siblings: vec![card("a", 0.0), card("b", 120.0), card("c", 240.0)],
        };
        assert_eq!(drop.placement().unwrap(), Placement { level: 1, order: 2 });

        let explicit = DropRequest { index: Some(0), ..drop.clone() };
        assert_eq!(explicit.placement().unwrap().order, 0);

        let blind = DropRequest { cursor_x: None, ..drop };
        assert_eq!(blind.placement().unwrap().order, 3);
    }

    #[test]
    fn test_drop_level_must_fit_column() {
        let drop = DropRequest {
            id: "x".to_string(),
            level: 3_000_000_000,
            index: Some(0),
            cursor_x: None,
            siblings: vec![],
        };
        assert!(matches!(drop.placement(), Err(AppError::Validation(_))));
    }
}
