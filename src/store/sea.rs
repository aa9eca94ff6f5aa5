//! SeaORM-backed stores

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Unchanged, ColumnTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{new_id, now, sort_posts, sort_records, PersonnelStore, PostStore};
use crate::entity::{personnel, post};
use crate::error::{AppError, AppResult, OptionExt};
use crate::model::{
    Collection, PersonnelDraft, PersonnelPatch, PersonnelRecord, Post, PostDraft, PostKind,
    PostPatch,
};

#[derive(Clone)]
pub struct SeaPersonnelStore {
    db: DatabaseConnection,
}

impl SeaPersonnelStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, collection: Collection, id: &str) -> AppResult<personnel::Model> {
        personnel::Entity::find_by_id(id.to_string())
            .filter(personnel::Column::Collection.eq(collection.as_str()))
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("{} record {}", collection, id))
    }
}

/// Every writable column marked Set; the legacy parent column stays NotSet
fn full_update(m: personnel::Model) -> personnel::ActiveModel {
    personnel::ActiveModel {
        id: Unchanged(m.id),
        collection: Unchanged(m.collection),
        name: Set(m.name),
        name_zh: Set(m.name_zh),
        role_ms: Set(m.role_ms),
        role_zh: Set(m.role_zh),
        category: Set(m.category),
        subject: Set(m.subject),
        level: Set(m.level),
        parent_ids: Set(m.parent_ids),
        parent_id: NotSet,
        image: Set(m.image),
        sort_order: Set(m.sort_order),
        created_at: Unchanged(m.created_at),
        updated_at: Set(m.updated_at),
    }
}

#[async_trait]
impl PersonnelStore for SeaPersonnelStore {
    async fn list(&self, collection: Collection) -> AppResult<Vec<PersonnelRecord>> {
        let models = personnel::Entity::find()
            .filter(personnel::Column::Collection.eq(collection.as_str()))
            .order_by_asc(personnel::Column::Level)
            .order_by_asc(personnel::Column::SortOrder)
            .all(&self.db)
            .await?;

        let mut records: Vec<PersonnelRecord> = models.into_iter().map(Into::into).collect();
        sort_records(&mut records);
        Ok(records)
    }

    async fn get(&self, collection: Collection, id: &str) -> AppResult<PersonnelRecord> {
        Ok(self.find(collection, id).await?.into())
    }

    async fn create(&self, collection: Collection, draft: PersonnelDraft) -> AppResult<PersonnelRecord> {
        let model = draft.into_model(collection, new_id(), now());
        let active = personnel::ActiveModel {
            id: Set(model.id),
            collection: Set(model.collection),
            name: Set(model.name),
            name_zh: Set(model.name_zh),
            role_ms: Set(model.role_ms),
            role_zh: Set(model.role_zh),
            category: Set(model.category),
            subject: Set(model.subject),
            level: Set(model.level),
            parent_ids: Set(model.parent_ids),
            parent_id: NotSet,
            image: Set(model.image),
            sort_order: Set(model.sort_order),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        };
        let inserted = active.insert(&self.db).await?;
        tracing::debug!("Created {} record {}", collection, inserted.id);
        Ok(inserted.into())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: PersonnelPatch,
    ) -> AppResult<PersonnelRecord> {
        let mut model = self.find(collection, id).await?;
        patch.apply(&mut model, now());
        let updated = full_update(model).update(&self.db).await?;
        Ok(updated.into())
    }

    async fn delete(&self, collection: Collection, id: &str) -> AppResult<()> {
        let res = personnel::Entity::delete_many()
            .filter(personnel::Column::Id.eq(id))
            .filter(personnel::Column::Collection.eq(collection.as_str()))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound(format!("{} record {}", collection, id)));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct SeaPostStore {
    db: DatabaseConnection,
}

impl SeaPostStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, kind: PostKind, id: &str) -> AppResult<post::Model> {
        post::Entity::find_by_id(id.to_string())
            .filter(post::Column::Kind.eq(kind.as_str()))
            .one(&self.db)
            .await?
            .ok_or_not_found(format!("{} {}", kind, id))
    }
}

fn post_active(m: post::Model, inserting: bool) -> post::ActiveModel {
    let key = |v: String| if inserting { Set(v) } else { Unchanged(v) };
    post::ActiveModel {
        id: key(m.id),
        kind: key(m.kind),
        title: Set(m.title),
        title_zh: Set(m.title_zh),
        subtitle: Set(m.subtitle),
        subtitle_zh: Set(m.subtitle_zh),
        body: Set(m.body),
        body_zh: Set(m.body_zh),
        date: Set(m.date),
        images: Set(m.images),
        attachments: Set(m.attachments),
        created_at: if inserting { Set(m.created_at) } else { Unchanged(m.created_at) },
        updated_at: Set(m.updated_at),
    }
}

#[async_trait]
impl PostStore for SeaPostStore {
    async fn list(&self, kind: PostKind) -> AppResult<Vec<Post>> {
        let models = post::Entity::find()
            .filter(post::Column::Kind.eq(kind.as_str()))
            .order_by_desc(post::Column::Date)
            .all(&self.db)
            .await?;

        let mut posts = models
            .into_iter()
            .map(Post::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        sort_posts(&mut posts);
        Ok(posts)
    }

    async fn get(&self, kind: PostKind, id: &str) -> AppResult<Post> {
        Post::try_from(self.find(kind, id).await?)
    }

    async fn create(&self, kind: PostKind, draft: PostDraft) -> AppResult<Post> {
        let model = draft.into_model(kind, new_id(), now());
        let inserted = post_active(model, true).insert(&self.db).await?;
        tracing::debug!("Created {} {}", kind, inserted.id);
        Post::try_from(inserted)
    }

    async fn update(&self, kind: PostKind, id: &str, patch: PostPatch) -> AppResult<Post> {
        let mut model = self.find(kind, id).await?;
        patch.apply(&mut model, now());
        let updated = post_active(model, false).update(&self.db).await?;
        Post::try_from(updated)
    }

    async fn delete(&self, kind: PostKind, id: &str) -> AppResult<()> {
        let res = post::Entity::delete_many()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::Kind.eq(kind.as_str()))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound(format!("{} {}", kind, id)));
        }
        Ok(())
    }
}
