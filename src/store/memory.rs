//! In-memory stores for development and tests
//!
//! Documents are held as entity models so reads go through the same
//! normalization as the database-backed stores.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::{new_id, now, sort_posts, sort_records, PersonnelStore, PostStore};
use crate::entity::{personnel, post};
use crate::error::{AppError, AppResult};
use crate::model::{
    Collection, PersonnelDraft, PersonnelPatch, PersonnelRecord, Post, PostDraft, PostKind,
    PostPatch,
};

#[derive(Clone, Default)]
pub struct MemoryPersonnelStore {
    docs: Arc<DashMap<String, personnel::Model>>,
}

impl MemoryPersonnelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored document as-is, legacy fields included
    pub fn insert_raw(&self, model: personnel::Model) {
        self.docs.insert(model.id.clone(), model);
    }

    pub fn raw(&self, id: &str) -> Option<personnel::Model> {
        self.docs.get(id).map(|m| m.clone())
    }

    fn not_found(collection: Collection, id: &str) -> AppError {
        AppError::NotFound(format!("{} record {}", collection, id))
    }
}

#[async_trait]
impl PersonnelStore for MemoryPersonnelStore {
    async fn list(&self, collection: Collection) -> AppResult<Vec<PersonnelRecord>> {
        let mut records: Vec<PersonnelRecord> = self
            .docs
            .iter()
            .filter(|m| m.collection == collection.as_str())
            .map(|m| m.value().clone().into())
            .collect();
        sort_records(&mut records);
        Ok(records)
    }

    async fn get(&self, collection: Collection, id: &str) -> AppResult<PersonnelRecord> {
        self.docs
            .get(id)
            .filter(|m| m.collection == collection.as_str())
            .map(|m| m.value().clone().into())
            .ok_or_else(|| Self::not_found(collection, id))
    }

    async fn create(&self, collection: Collection, draft: PersonnelDraft) -> AppResult<PersonnelRecord> {
        let model = draft.into_model(collection, new_id(), now());
        self.docs.insert(model.id.clone(), model.clone());
        Ok(model.into())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: PersonnelPatch,
    ) -> AppResult<PersonnelRecord> {
        let mut entry = self
            .docs
            .get_mut(id)
            .filter(|m| m.collection == collection.as_str())
            .ok_or_else(|| Self::not_found(collection, id))?;
        patch.apply(entry.value_mut(), now());
        Ok(entry.value().clone().into())
    }

    async fn delete(&self, collection: Collection, id: &str) -> AppResult<()> {
        self.docs
            .remove_if(id, |_, m| m.collection == collection.as_str())
            .map(|_| ())
            .ok_or_else(|| Self::not_found(collection, id))
    }
}

#[derive(Clone, Default)]
pub struct MemoryPostStore {
    docs: Arc<DashMap<String, post::Model>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(kind: PostKind, id: &str) -> AppError {
        AppError::NotFound(format!("{} {}", kind, id))
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn list(&self, kind: PostKind) -> AppResult<Vec<Post>> {
        let mut posts = self
            .docs
            .iter()
            .filter(|m| m.kind == kind.as_str())
            .map(|m| Post::try_from(m.value().clone()))
            .collect::<AppResult<Vec<_>>>()?;
        sort_posts(&mut posts);
        Ok(posts)
    }

    async fn get(&self, kind: PostKind, id: &str) -> AppResult<Post> {
        let model = self
            .docs
            .get(id)
            .filter(|m| m.kind == kind.as_str())
            .map(|m| m.value().clone())
            .ok_or_else(|| Self::not_found(kind, id))?;
        Post::try_from(model)
    }

    async fn create(&self, kind: PostKind, draft: PostDraft) -> AppResult<Post> {
        let model = draft.into_model(kind, new_id(), now());
        self.docs.insert(model.id.clone(), model.clone());
        Post::try_from(model)
    }

    async fn update(&self, kind: PostKind, id: &str, patch: PostPatch) -> AppResult<Post> {
        let model = {
            let mut entry = self
                .docs
                .get_mut(id)
                .filter(|m| m.kind == kind.as_str())
                .ok_or_else(|| Self::not_found(kind, id))?;
            patch.apply(entry.value_mut(), now());
            entry.value().clone()
        };
        Post::try_from(model)
    }

    async fn delete(&self, kind: PostKind, id: &str) -> AppResult<()> {
        self.docs
            .remove_if(id, |_, m| m.kind == kind.as_str())
            .map(|_| ())
            .ok_or_else(|| Self::not_found(kind, id))
    }
}
