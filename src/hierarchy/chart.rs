//! Org chart geometry
//!
//! Cards are laid out from the records themselves: one row per level,
//! cards in a row by order, rows centered on the widest one. Connection
//! curves are computed from that layout instead of measuring a rendered page.

use serde::Serialize;
use std::collections::HashMap;

use crate::model::personnel::display_order;
use crate::model::PersonnelRecord;

pub const CARD_WIDTH: f64 = 180.0;
pub const CARD_HEIGHT: f64 = 72.0;
pub const GAP_X: f64 = 24.0;
pub const GAP_Y: f64 = 64.0;
pub const MARGIN: f64 = 16.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardBox {
    pub id: String,
    pub name: String,
    pub role: String,
    pub level: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CardBox {
    pub fn bottom_center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height)
    }

    pub fn top_center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    #[serde(rename = "parentId")]
    pub parent_id: String,
    #[serde(rename = "childId")]
    pub child_id: String,
    /// SVG path data
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub cards: Vec<CardBox>,
    pub connections: Vec<Connection>,
}

/// Cubic curve from `from` down to `to`, both control points on the vertical midpoint
pub fn curve_path(from: (f64, f64), to: (f64, f64)) -> String {
    let (x1, y1) = from;
    let (x2, y2) = to;
    let my = (y1 + y2) / 2.0;
    format!("M {x1} {y1} C {x1} {my}, {x2} {my}, {x2} {y2}")
}

/// Every (parent, child) pair implied by `parentIds` where both records
/// exist, in record order
pub fn edges(records: &[PersonnelRecord]) -> Vec<(&PersonnelRecord, &PersonnelRecord)> {
    let by_id: HashMap<&str, &PersonnelRecord> = records.iter().map(|r| (r.id.as_str(), r)).collect();
    let by_id = &by_id;
    records
        .iter()
        .flat_map(move |child| {
            child
                .parent_ids
                .iter()
                .filter_map(move |pid| by_id.get(pid.as_str()).copied())
                .map(move |parent| (parent, child))
        })
        .collect()
}

pub fn chart_layout(records: &[PersonnelRecord]) -> ChartLayout {
    let mut rows: Vec<(u32, Vec<&PersonnelRecord>)> = Vec::new();
    let mut sorted: Vec<&PersonnelRecord> = records.iter().collect();
    sorted.sort_by(|a, b| display_order(a, b));
    for record in sorted {
        match rows.last_mut() {
            Some((level, row)) if *level == record.level => row.push(record),
            _ => rows.push((record.level, vec![record])),
        }
    }

    let row_width = |n: usize| n as f64 * CARD_WIDTH + n.saturating_sub(1) as f64 * GAP_X;
    let widest = rows.iter().map(|(_, row)| row_width(row.len())).fold(0.0, f64::max);

    let mut cards = Vec::with_capacity(records.len());
    for (row_index, (level, row)) in rows.iter().enumerate() {
        let offset = MARGIN + (widest - row_width(row.len())) / 2.0;
        let y = MARGIN + row_index as f64 * (CARD_HEIGHT + GAP_Y);
        for (col, record) in row.iter().enumerate() {
            cards.push(CardBox {
                id: record.id.clone(),
                name: record.name.clone(),
                role: record.role_ms.clone(),
                level: *level,
                x: offset + col as f64 * (CARD_WIDTH + GAP_X),
                y,
                width: CARD_WIDTH,
                height: CARD_HEIGHT,
            });
        }
    }

    let boxes: HashMap<&str, &CardBox> = cards.iter().map(|c| (c.id.as_str(), c)).collect();
    let connections = edges(records)
        .into_iter()
        .filter_map(|(parent, child)| {
            let from = boxes.get(parent.id.as_str())?.bottom_center();
            let to = boxes.get(child.id.as_str())?.top_center();
            Some(Connection {
                parent_id: parent.id.clone(),
                child_id: child.id.clone(),
                path: curve_path(from, to),
            })
        })
        .collect();

    let height = if rows.is_empty() {
        0.0
    } else {
        rows.len() as f64 * CARD_HEIGHT + (rows.len() - 1) as f64 * GAP_Y
    };

    ChartLayout {
        width: widest + 2.0 * MARGIN,
        height: height + 2.0 * MARGIN,
        cards,
        connections,
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Standalone SVG document for a layout
pub fn render_svg(layout: &ChartLayout) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = layout.width,
        h = layout.height
    );
    for conn in &layout.connections {
        svg.push_str(&format!(
            r##"<path d="{}" fill="none" stroke="#64748b" stroke-width="2"/>"##,
            conn.path
        ));
    }
    for card in &layout.cards {
        let cx = card.x + card.width / 2.0;
        svg.push_str(&format!(
            r##"<g data-id="{id}"><rect x="{x}" y="{y}" width="{w}" height="{h}" rx="8" fill="#ffffff" stroke="#1e3a8a"/><text x="{cx}" y="{ny}" text-anchor="middle" font-size="14" font-weight="600">{name}</text><text x="{cx}" y="{ry}" text-anchor="middle" font-size="12" fill="#475569">{role}</text></g>"##,
            id = escape(&card.id),
            x = card.x,
            y = card.y,
            w = card.width,
            h = card.height,
            ny = card.y + 30.0,
            ry = card.y + 52.0,
            name = escape(&card.name),
            role = escape(&card.role),
        ));
    }
    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::personnel::fixtures::record;

    fn org() -> Vec<PersonnelRecord> {
        let hm = record("hm", "Guru Besar", 0);
        let mut pk1 = record("pk1", "PK Kurikulum", 1);
        pk1.parent_ids = vec!["hm".to_string()];
        let mut pk2 = record("pk2", "PK HEM", 1);
        pk2.parent_ids = vec!["hm".to_string(), "ghost".to_string()];
        pk2.order = -1;
        vec![hm, pk1, pk2]
    }

    #[test]
    fn test_curve_path() {
        assert_eq!(
            curve_path((100.0, 72.0), (50.0, 200.0)),
            "M 100 72 C 100 136, 50 136, 50 200"
        );
    }

    #[test]
    fn test_edges_skip_dangling_parents() {
        let records = org();
        let pairs: Vec<(&str, &str)> = edges(&records)
            .into_iter()
            .map(|(p, c)| (p.id.as_str(), c.id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("hm", "pk1"), ("hm", "pk2")]);
    }

    #[test]
    fn test_layout_rows_and_centering() {
        let layout = chart_layout(&org());
        let card = |id: &str| layout.cards.iter().find(|c| c.id == id).unwrap().clone();

        let hm = card("hm");
        let pk1 = card("pk1");
        let pk2 = card("pk2");
        assert_eq!(hm.y, MARGIN);
        assert_eq!(pk1.y, MARGIN + CARD_HEIGHT + GAP_Y);
        // order -1 puts PK HEM first in its row
        assert!(pk2.x < pk1.x);
        // single card row is centered over the two-card row
        let row_mid = (pk2.x + pk1.x + CARD_WIDTH) / 2.0;
        assert_eq!(hm.x + CARD_WIDTH / 2.0, row_mid);

        assert_eq!(layout.connections.len(), 2);
        let first = &layout.connections[0];
        assert_eq!(first.path, curve_path(hm.bottom_center(), pk1.top_center()));
    }

    #[test]
    fn test_row_order_matches_listing() {
        let mut records = vec![
            record("b", "Badrul", 2),
            record("a2", "ali", 2),
            record("a1", "Ali", 2),
        ];
        let ids: Vec<String> = chart_layout(&records).cards.into_iter().map(|c| c.id).collect();
        crate::store::sort_records(&mut records);
        let listed: Vec<String> = records.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a1", "a2", "b"]);
        assert_eq!(ids, listed);
    }

    #[test]
    fn test_empty_layout() {
        let layout = chart_layout(&[]);
        assert!(layout.cards.is_empty());
        assert_eq!(layout.width, 2.0 * MARGIN);
    }

    #[test]
    fn test_svg_escapes_text() {
        let mut r = record("a", "Tan & <Sons>", 0);
        r.role_ms = "\"Bendahari\"".to_string();
        let svg = render_svg(&chart_layout(&[r]));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Tan &amp; &lt;Sons&gt;"));
        assert!(svg.contains("&quot;Bendahari&quot;"));
    }
}
