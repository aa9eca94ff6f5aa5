//! Personnel entity - staff, PTA and school-board documents
//!
//! Table: school_personnel. The three personnel collections share one table,
//! told apart by the `collection` column. Loosely typed fields are kept as
//! JSONB exactly as written and normalized when read.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "school_personnel")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// staff / PTA / LPS
    #[sea_orm(column_type = "String(Some(16))", indexed)]
    pub collection: String,

    #[sea_orm(column_type = "String(Some(128))")]
    pub name: String,

    #[sea_orm(column_type = "String(Some(128))", nullable)]
    pub name_zh: Option<String>,

    #[sea_orm(column_type = "String(Some(128))")]
    pub role_ms: String,

    #[sea_orm(column_type = "String(Some(128))")]
    pub role_zh: String,

    /// Comma-separated tags
    #[sea_orm(column_type = "String(Some(256))")]
    pub category: String,

    /// Array of subject codes (older rows hold a comma string)
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub subject: Option<Json>,

    pub level: i32,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub parent_ids: Option<Json>,

    /// Legacy single parent, read only
    #[sea_orm(column_type = "String(Some(64))", nullable)]
    pub parent_id: Option<String>,

    /// Either a URL string or an object with a `url` field
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub image: Option<Json>,

    pub sort_order: i32,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// parentIds is a list of ids, resolved in memory rather than through relations

impl ActiveModelBehavior for ActiveModel {}
