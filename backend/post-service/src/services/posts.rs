/// Post service - identity-gated post operations and creation events
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::PostPolicy;
use crate::db::PostStore;
use crate::error::{PostError, Result, StoreError};
use crate::middleware::{AuthGate, RequestContext};
use crate::models::{NewPostEvent, Post};
use crate::services::likes;
use crate::services::notifications::{NotificationBus, NEW_POST};

/// Confirmation returned by `delete_post`
pub const POST_DELETED: &str = "Post deleted successfully";

pub struct PostService {
    store: Arc<dyn PostStore>,
    auth: Arc<dyn AuthGate>,
    bus: NotificationBus<NewPostEvent>,
    policy: PostPolicy,
    /// Per-post locks serializing read-modify-write sequences
    post_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl PostService {
    pub fn new(
        store: Arc<dyn PostStore>,
        auth: Arc<dyn AuthGate>,
        bus: NotificationBus<NewPostEvent>,
    ) -> Self {
        Self::with_policy(store, auth, bus, PostPolicy::default())
    }

    pub fn with_policy(
        store: Arc<dyn PostStore>,
        auth: Arc<dyn AuthGate>,
        bus: NotificationBus<NewPostEvent>,
        policy: PostPolicy,
    ) -> Self {
        Self {
            store,
            auth,
            bus,
            policy,
            post_locks: DashMap::new(),
        }
    }

    pub fn bus(&self) -> &NotificationBus<NewPostEvent> {
        &self.bus
    }

    fn post_lock(&self, post_id: Uuid) -> Arc<Mutex<()>> {
        self.post_locks
            .entry(post_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Read a post while its lock is held; a missing post gives its lock back
    async fn load_for_update(&self, post_id: Uuid) -> Result<Post> {
        match self.store.get_by_id(post_id).await {
            Ok(post) => Ok(post),
            Err(err) => {
                if matches!(err, StoreError::NotFound(_)) {
                    self.post_locks.remove(&post_id);
                }
                Err(store_failure("get_by_id", err))
            }
        }
    }

    /// All posts, newest first
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        self.store
            .list_all()
            .await
            .map_err(|e| store_failure("list_all", e))
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.store
            .get_by_id(post_id)
            .await
            .map_err(|e| store_failure("get_by_id", e))
    }

    /// Create a post for the caller and announce it on `NEW_POST`
    pub async fn create_post(&self, body: &str, ctx: &RequestContext) -> Result<Post> {
        let identity = self.auth.authenticate(ctx)?;

        if self.policy.reject_empty_body && body.trim().is_empty() {
            return Err(PostError::ValidationError(
                "Post body must not be empty".to_string(),
            ));
        }

        let post = self
            .store
            .save(Post::new(body, &identity, Utc::now()))
            .await
            .map_err(|e| store_failure("save", e))?;

        info!(post_id = %post.id, username = %identity.username, "post created");

        // Announce only once the record is stored
        let delivered = self.bus.publish(
            NEW_POST,
            NewPostEvent {
                new_post: post.clone(),
            },
        );
        tracing::debug!(post_id = %post.id, delivered, "new post announced");

        Ok(post)
    }

    /// Delete one of the caller's own posts
    pub async fn delete_post(&self, post_id: Uuid, ctx: &RequestContext) -> Result<String> {
        let identity = self.auth.authenticate(ctx)?;

        let lock = self.post_lock(post_id);
        let _guard = lock.lock().await;

        let post = self.load_for_update(post_id).await?;

        if !post.is_authored_by(&identity) {
            warn!(
                %post_id,
                username = %identity.username,
                author = %post.author_username,
                "delete denied for non-author"
            );
            return Err(PostError::PermissionDenied("Action not allowed".to_string()));
        }

        self.store
            .delete_by_id(post_id)
            .await
            .map_err(|e| store_failure("delete_by_id", e))?;

        self.post_locks.remove(&post_id);
        info!(%post_id, username = %identity.username, "post deleted");

        Ok(POST_DELETED.to_string())
    }

    /// Toggle the caller's like on a post
    pub async fn like_post(&self, post_id: Uuid, ctx: &RequestContext) -> Result<Post> {
        let identity = self.auth.authenticate(ctx)?;

        // Held across read -> toggle -> save so concurrent toggles cannot
        // overwrite each other
        let lock = self.post_lock(post_id);
        let _guard = lock.lock().await;

        let mut post = self.load_for_update(post_id).await?;

        post.likes = likes::toggle(&post.likes, &identity.username, Utc::now());
        let liked = likes::state_of(&post.likes, &identity.username) == likes::LikeState::Present;

        let post = self
            .store
            .save(post)
            .await
            .map_err(|e| store_failure("save", e))?;

        info!(
            %post_id,
            username = %identity.username,
            liked,
            like_count = post.like_count(),
            "like toggled"
        );

        Ok(post)
    }
}

fn store_failure(operation: &'static str, err: StoreError) -> PostError {
    let err = PostError::from_store(operation, err);
    if let PostError::StoreFailure { source, .. } = &err {
        error!(operation, error = %source, "post store operation failed");
    }
    err
}
