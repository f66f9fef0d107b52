//! Post repository, behind a trait so handlers can run against either the
//! Postgres store or an in-memory one in tests.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Post, PostPayload};

/// Cloneable handle to a store, the thing the connection cache hands out.
pub type SharedStore = Arc<dyn PostStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage layer rejected the document (its own validation, the
    /// second line of defense behind the handler checks).
    #[error("document rejected by storage: {0}")]
    Rejected(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// CRUD over the posts collection.
///
/// Absence is modeled in the signatures (`Option` / `bool`), not in
/// `StoreError`; errors always mean the operation itself failed.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, newest first by creation time.
    async fn list(&self) -> Result<Vec<Post>, StoreError>;

    /// Insert a new post; the store assigns id and both timestamps.
    async fn create(&self, payload: &PostPayload) -> Result<Post, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// Replace title/content/author and refresh `updated_at`, keeping id and
    /// `created_at`. `None` if no post has this id.
    async fn update(&self, id: Uuid, payload: &PostPayload) -> Result<Option<Post>, StoreError>;

    /// `false` if no post had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
