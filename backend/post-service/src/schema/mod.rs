//! GraphQL schema: post queries, mutations and the `newPost` subscription

pub mod post;
pub mod subscription;

use async_graphql::{MergedObject, Schema};
use std::sync::Arc;

use crate::config::GraphQLConfig;
use crate::services::PostService;

/// Root query object
#[derive(MergedObject, Default)]
pub struct QueryRoot(post::PostQuery);

/// Root mutation object
#[derive(MergedObject, Default)]
pub struct MutationRoot(post::PostMutation);

/// GraphQL App Schema type with WebSocket subscriptions
pub type AppSchema = Schema<QueryRoot, MutationRoot, subscription::SubscriptionRoot>;

/// Build the schema around an already composed `PostService`.
///
/// The service's notification bus is registered as schema data so the
/// subscription resolver and the service share one registry.
pub fn build_schema(service: Arc<PostService>, config: &GraphQLConfig) -> AppSchema {
    let bus = service.bus().clone();

    let builder = Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        subscription::SubscriptionRoot,
    )
    .data(service)
    .data(bus);

    if config.introspection {
        builder.finish()
    } else {
        builder.disable_introspection().finish()
    }
}
