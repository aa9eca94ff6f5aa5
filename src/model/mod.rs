//! Domain records, normalized from stored documents

pub mod personnel;
pub mod post;

pub use personnel::{
    Collection, ImageRef, PersonnelDraft, PersonnelPatch, PersonnelRecord, PersonnelView,
};
pub use post::{Attachment, Post, PostDraft, PostForm, PostKind, PostPatch, PostView};
