// NotificationBus: in-process topic fan-out
//
// Every subscriber owns an unbounded channel; publishing clones the payload
// into each channel registered on the topic and returns immediately. Nothing
// is buffered for subscribers that register later.

use dashmap::DashMap;
use futures_util::stream::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;
use uuid::Uuid;

/// Topic announcing freshly created posts
pub const NEW_POST: &str = "NEW_POST";

/// Subscription ID type for uniquely identifying subscribers
pub type SubscriptionId = Uuid;

struct Subscriber<T> {
    topic: String,
    sender: UnboundedSender<T>,
}

type Registry<T> = Arc<DashMap<SubscriptionId, Subscriber<T>>>;

/// Publish/subscribe hub shared by the service and the transport layer
pub struct NotificationBus<T> {
    subscribers: Registry<T>,
}

impl<T> Clone for NotificationBus<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T> Default for NotificationBus<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NotificationBus<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(DashMap::new()),
        }
    }

    /// Register a new subscriber on `topic`.
    ///
    /// The returned stream only yields payloads published after this call.
    /// Dropping it deregisters the subscriber.
    pub fn subscribe(&self, topic: &str) -> Subscription<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();

        self.subscribers.insert(
            id,
            Subscriber {
                topic: topic.to_string(),
                sender,
            },
        );
        debug!(subscription_id = %id, topic, "subscriber registered");

        Subscription {
            id,
            receiver,
            registry: Arc::clone(&self.subscribers),
        }
    }

    /// Hand `payload` to every subscriber of `topic`.
    ///
    /// Never blocks and never fails. Returns how many subscribers accepted the
    /// payload; subscribers whose stream is gone are pruned.
    pub fn publish(&self, topic: &str, payload: T) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for entry in self.subscribers.iter() {
            if entry.topic != topic {
                continue;
            }
            match entry.sender.send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => closed.push(*entry.key()),
            }
        }

        // removal must wait until the iterator has released its shard locks
        for id in closed {
            self.subscribers.remove(&id);
            debug!(subscription_id = %id, topic, "dropped closed subscriber");
        }

        debug!(topic, delivered, "published notification");
        delivered
    }

    /// Number of subscribers currently registered on `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers
            .iter()
            .filter(|entry| entry.topic == topic)
            .count()
    }
}

/// Live stream of payloads for one subscriber
pub struct Subscription<T> {
    id: SubscriptionId,
    receiver: UnboundedReceiver<T>,
    registry: Registry<T>,
}

impl<T> Subscription<T> {
    /// Wait for the next payload
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}
