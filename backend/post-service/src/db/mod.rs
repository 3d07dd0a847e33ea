/// Database access layer
///
/// This module provides:
/// - `PostStore`: the storage contract the service depends on
/// - `InMemoryPostStore`: process-local store for development and tests
/// - `PgPostStore`: PostgreSQL store backed by sqlx
use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::Post;

pub mod memory;
pub mod post_repo;

pub use memory::InMemoryPostStore;
pub use post_repo::PgPostStore;

/// Storage contract for posts
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, newest first
    async fn list_all(&self) -> Result<Vec<Post>, StoreError>;

    /// Fails with `StoreError::NotFound` if absent
    async fn get_by_id(&self, id: Uuid) -> Result<Post, StoreError>;

    /// Insert or update, returning the stored record
    async fn save(&self, post: Post) -> Result<Post, StoreError>;

    /// Fails with `StoreError::NotFound` if absent
    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError>;
}
