//! Record store accessors
//!
//! Thin CRUD pass-throughs over the document collections. No retries, no
//! batching, no transactions: each call is one read or one write.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::model::personnel::display_order;
use crate::model::{
    Collection, PersonnelDraft, PersonnelPatch, PersonnelRecord, Post, PostDraft, PostKind,
    PostPatch,
};

mod memory;
mod sea;

pub use memory::{MemoryPersonnelStore, MemoryPostStore};
pub use sea::{SeaPersonnelStore, SeaPostStore};

#[async_trait]
pub trait PersonnelStore: Send + Sync {
    /// All records of a collection, by level, then order, then name
    async fn list(&self, collection: Collection) -> AppResult<Vec<PersonnelRecord>>;

    async fn get(&self, collection: Collection, id: &str) -> AppResult<PersonnelRecord>;

    /// Insert a new record; the store assigns the id
    async fn create(&self, collection: Collection, draft: PersonnelDraft) -> AppResult<PersonnelRecord>;

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: PersonnelPatch,
    ) -> AppResult<PersonnelRecord>;

    /// Remove one record. Other records' `parentIds` are left untouched.
    async fn delete(&self, collection: Collection, id: &str) -> AppResult<()>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Newest first
    async fn list(&self, kind: PostKind) -> AppResult<Vec<Post>>;

    async fn get(&self, kind: PostKind, id: &str) -> AppResult<Post>;

    async fn create(&self, kind: PostKind, draft: PostDraft) -> AppResult<Post>;

    async fn update(&self, kind: PostKind, id: &str, patch: PostPatch) -> AppResult<Post>;

    async fn delete(&self, kind: PostKind, id: &str) -> AppResult<()>;
}

/// Display order shared by every backend
pub(crate) fn sort_records(records: &mut [PersonnelRecord]) {
    records.sort_by(display_order);
}

pub(crate) fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
