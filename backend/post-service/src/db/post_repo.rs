use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::PostStore;
use crate::error::StoreError;
use crate::models::{Like, Post};

/// PostgreSQL-backed post store
///
/// Likes live next to the post as a JSONB array, so a post is always read
/// and written as one row.
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    body: String,
    author_id: String,
    author_username: String,
    created_at: DateTime<Utc>,
    likes: Json<Vec<Like>>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            body: row.body,
            author_id: row.author_id,
            author_username: row.author_username,
            created_at: row.created_at,
            likes: row.likes.0,
        }
    }
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await?;

        info!(max_connections, "post store connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn list_all(&self) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, body, author_id, author_username, created_at, likes
            FROM posts
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Post, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, body, author_id, author_username, created_at, likes
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Post::from).ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, post: Post) -> Result<Post, StoreError> {
        // only likes are mutable once a post exists
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, body, author_id, author_username, created_at, likes)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET likes = EXCLUDED.likes
            RETURNING id, body, author_id, author_username, created_at, likes
            "#,
        )
        .bind(post.id)
        .bind(&post.body)
        .bind(&post.author_id)
        .bind(&post.author_username)
        .bind(post.created_at)
        .bind(Json(&post.likes))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }
}
