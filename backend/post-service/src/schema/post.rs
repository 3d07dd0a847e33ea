//! Post queries and mutations

use async_graphql::{Context, ErrorExtensions, Object, Result as GraphQLResult, SimpleObject, ID};
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

use crate::middleware::RequestContext;
use crate::models::{self, parse_post_id};
use crate::services::PostService;

#[derive(SimpleObject, Clone, Debug)]
pub struct Like {
    pub username: String,
    pub created_at: String,
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Post {
    pub id: ID,
    pub body: String,
    /// Author's username
    pub username: String,
    pub author_id: String,
    pub created_at: String,
    pub likes: Vec<Like>,
    pub like_count: i32,
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<models::Like> for Like {
    fn from(like: models::Like) -> Self {
        Like {
            username: like.username,
            created_at: timestamp(like.created_at),
        }
    }
}

impl From<models::Post> for Post {
    fn from(post: models::Post) -> Self {
        let like_count = post.like_count() as i32;

        Post {
            id: ID(post.id.to_string()),
            body: post.body,
            username: post.author_username,
            author_id: post.author_id,
            created_at: timestamp(post.created_at),
            likes: post.likes.into_iter().map(Like::from).collect(),
            like_count,
        }
    }
}

/// Credentials attached to the request, anonymous when absent
fn request_context(ctx: &Context<'_>) -> RequestContext {
    ctx.data_opt::<RequestContext>().cloned().unwrap_or_default()
}

#[derive(Default)]
pub struct PostQuery;

#[Object]
impl PostQuery {
    /// All posts, newest first
    async fn get_posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<Post>> {
        let service = ctx.data::<Arc<PostService>>()?;

        let posts = service.list_posts().await.map_err(|e| e.extend())?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    async fn get_post(&self, ctx: &Context<'_>, post_id: ID) -> GraphQLResult<Post> {
        let service = ctx.data::<Arc<PostService>>()?;
        let post_id = parse_post_id(&post_id).map_err(|e| e.extend())?;

        let post = service.get_post(post_id).await.map_err(|e| e.extend())?;
        Ok(post.into())
    }
}

#[derive(Default)]
pub struct PostMutation;

#[Object]
impl PostMutation {
    async fn create_post(&self, ctx: &Context<'_>, body: String) -> GraphQLResult<Post> {
        let service = ctx.data::<Arc<PostService>>()?;

        let post = service
            .create_post(&body, &request_context(ctx))
            .await
            .map_err(|e| e.extend())?;
        Ok(post.into())
    }

    /// Only the author may delete a post
    async fn delete_post(&self, ctx: &Context<'_>, post_id: ID) -> GraphQLResult<String> {
        let service = ctx.data::<Arc<PostService>>()?;
        let post_id = parse_post_id(&post_id).map_err(|e| e.extend())?;

        service
            .delete_post(post_id, &request_context(ctx))
            .await
            .map_err(|e| e.extend())
    }

    /// Like the post, or unlike it if the caller already does
    async fn like_post(&self, ctx: &Context<'_>, post_id: ID) -> GraphQLResult<Post> {
        let service = ctx.data::<Arc<PostService>>()?;
        let post_id = parse_post_id(&post_id).map_err(|e| e.extend())?;

        let post = service
            .like_post(post_id, &request_context(ctx))
            .await
            .map_err(|e| e.extend())?;
        Ok(post.into())
    }
}
