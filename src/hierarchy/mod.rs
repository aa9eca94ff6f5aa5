//! Staff hierarchy editor logic: list view, edit form, canvas and chart
//!
//! Pure functions over an already fetched record list.

pub mod canvas;
pub mod chart;
pub mod form;
pub mod listing;

pub use canvas::{DropRequest, LinkOutcome, LinkRejection, LinkState, Placement, Point};
pub use chart::{chart_layout, render_svg, ChartLayout};
pub use form::{level_warnings, parent_options, ParentOption, PersonnelForm};
pub use listing::{categories, list_page, ListQuery, Page};
