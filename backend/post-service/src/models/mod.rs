/// Data models for post-service
///
/// This module defines structures for:
/// - Identity: the authenticated caller, derived from a verified token
/// - Post: a shared post together with its like set
/// - Like: one username's like marker on a post
/// - NewPostEvent: the payload announced on the `NEW_POST` topic
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PostError;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

/// A username's like marker on a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A shared post
///
/// `body`, `author_id`, `author_username` and `created_at` never change after
/// creation. `likes` holds at most one entry per username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub body: String,
    pub author_id: String,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub likes: Vec<Like>,
}

impl Post {
    /// Build a fresh post authored by `author` with no likes
    pub fn new(body: impl Into<String>, author: &Identity, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            body: body.into(),
            author_id: author.id.clone(),
            author_username: author.username.clone(),
            created_at,
            likes: Vec::new(),
        }
    }

    pub fn is_authored_by(&self, identity: &Identity) -> bool {
        self.author_username == identity.username
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}

/// Payload published on `NEW_POST`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPostEvent {
    pub new_post: Post,
}

/// Parse a post identifier received from a caller.
///
/// A string that is not a UUID can never name a stored post, so it is
/// reported as `NotFound` rather than as an input error.
pub fn parse_post_id(raw: &str) -> Result<Uuid, PostError> {
    Uuid::parse_str(raw.trim()).map_err(|_| PostError::NotFound(format!("Post not found: {}", raw)))
}

/// Order posts newest first; ties fall back to id so the order is total.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
