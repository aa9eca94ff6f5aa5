//! Entity module - SeaORM entity definitions
//!
//! One table per document shape

pub mod personnel;
pub mod post;
