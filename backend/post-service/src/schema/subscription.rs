//! GraphQL Subscriptions (WebSocket support)

use async_graphql::{Context, Result, Subscription};
use futures_util::stream::{Stream, StreamExt};

use super::post::Post;
use crate::models::NewPostEvent;
use crate::services::{NotificationBus, NEW_POST};

#[derive(Default)]
pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Posts created after the subscription starts
    async fn new_post(&self, ctx: &Context<'_>) -> Result<impl Stream<Item = Post>> {
        let bus = ctx.data::<NotificationBus<NewPostEvent>>()?;

        Ok(bus
            .subscribe(NEW_POST)
            .map(|event| Post::from(event.new_post)))
    }
}
