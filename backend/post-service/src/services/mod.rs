/// Business logic layer for post-service
///
/// - Post service: list/get/create/delete/like orchestration
/// - Likes: the like-toggle state transition
/// - Notifications: topic fan-out for live subscribers
pub mod likes;
pub mod notifications;
pub mod posts;

// Re-export commonly used services
pub use notifications::{NotificationBus, Subscription, NEW_POST};
pub use posts::{PostService, POST_DELETED};
