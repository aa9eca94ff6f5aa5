//! Post entity - announcements, management bulletins, retirement and transfer notices
//!
//! Table: school_post

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "school_post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// announcement / management / persaraan / pertukaran
    #[sea_orm(column_type = "String(Some(16))", indexed)]
    pub kind: String,

    #[sea_orm(column_type = "String(Some(256))")]
    pub title: String,

    #[sea_orm(column_type = "String(Some(256))", nullable)]
    pub title_zh: Option<String>,

    /// Role for retirement profiles, new school for transfers
    #[sea_orm(column_type = "String(Some(256))", nullable)]
    pub subtitle: Option<String>,

    #[sea_orm(column_type = "String(Some(256))", nullable)]
    pub subtitle_zh: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub body_zh: Option<String>,

    pub date: Date,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub images: Option<Json>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub attachments: Option<Json>,

    pub created_at: i64,

    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
