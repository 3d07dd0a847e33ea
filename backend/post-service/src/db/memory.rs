use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::PostStore;
use crate::error::StoreError;
use crate::models::{sort_newest_first, Post};

/// Process-local post store
#[derive(Clone, Default)]
pub struct InMemoryPostStore {
    posts: Arc<RwLock<HashMap<Uuid, Post>>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn list_all(&self) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self.posts.read().await.values().cloned().collect();
        sort_newest_first(&mut posts);
        Ok(posts)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Post, StoreError> {
        self.posts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, post: Post) -> Result<Post, StoreError> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        self.posts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
