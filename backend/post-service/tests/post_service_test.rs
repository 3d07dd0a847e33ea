//! PostService behavior against the in-memory store and the JWT gate

mod common;

use chrono::{Duration, Utc};
use futures::future::join_all;
use std::time::Duration as StdDuration;
use uuid::Uuid;

use common::TestHarness;
use post_service::db::PostStore;
use post_service::middleware::RequestContext;
use post_service::models::{parse_post_id, Identity, Post};
use post_service::services::{NEW_POST, POST_DELETED};
use post_service::PostError;

#[tokio::test]
async fn test_create_post_announces_stored_post() {
    let h = TestHarness::new();
    let mut subscriber = h.service.bus().subscribe(NEW_POST);

    let post = h
        .service
        .create_post("hello", &h.as_user("alice"))
        .await
        .unwrap();

    assert_eq!(post.body, "hello");
    assert_eq!(post.author_username, "alice");
    assert_eq!(post.author_id, "id-alice");
    assert!(post.likes.is_empty());

    let event = tokio::time::timeout(StdDuration::from_secs(1), subscriber.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.new_post, post);

    // the announced post is already readable
    let stored = h.service.get_post(event.new_post.id).await.unwrap();
    assert_eq!(stored, post);
}

#[tokio::test]
async fn test_every_subscriber_receives_each_creation() {
    let h = TestHarness::new();
    let mut first = h.service.bus().subscribe(NEW_POST);
    let mut second = h.service.bus().subscribe(NEW_POST);

    let a = h.service.create_post("a", &h.as_user("alice")).await.unwrap();
    let b = h.service.create_post("b", &h.as_user("bob")).await.unwrap();

    for sub in [&mut first, &mut second] {
        assert_eq!(sub.recv().await.unwrap().new_post.id, a.id);
        assert_eq!(sub.recv().await.unwrap().new_post.id, b.id);
    }
}

#[tokio::test]
async fn test_subscriber_after_creation_sees_nothing() {
    let h = TestHarness::new();
    h.service.create_post("early", &h.as_user("alice")).await.unwrap();

    let mut late = h.service.bus().subscribe(NEW_POST);
    let waited = tokio::time::timeout(StdDuration::from_millis(50), late.recv()).await;
    assert!(waited.is_err());
}

#[tokio::test]
async fn test_like_then_unlike() {
    let h = TestHarness::new();
    let post = h.service.create_post("hello", &h.as_user("alice")).await.unwrap();

    let liked = h.service.like_post(post.id, &h.as_user("bob")).await.unwrap();
    assert_eq!(liked.likes.len(), 1);
    assert_eq!(liked.likes[0].username, "bob");

    let unliked = h.service.like_post(post.id, &h.as_user("bob")).await.unwrap();
    assert!(unliked.likes.is_empty());

    // immutable fields survive toggles
    assert_eq!(unliked.body, post.body);
    assert_eq!(unliked.created_at, post.created_at);
    assert_eq!(unliked.author_username, post.author_username);
}

#[tokio::test]
async fn test_unlike_only_removes_acting_user() {
    let h = TestHarness::new();
    let post = h.service.create_post("hello", &h.as_user("alice")).await.unwrap();

    for user in ["bob", "carol", "dave"] {
        h.service.like_post(post.id, &h.as_user(user)).await.unwrap();
    }
    let after = h.service.like_post(post.id, &h.as_user("carol")).await.unwrap();

    let names: Vec<_> = after.likes.iter().map(|l| l.username.as_str()).collect();
    assert_eq!(names, vec!["bob", "dave"]);
}

#[tokio::test]
async fn test_author_can_delete() {
    let h = TestHarness::new();
    let post = h.service.create_post("bye", &h.as_user("alice")).await.unwrap();

    let message = h
        .service
        .delete_post(post.id, &h.as_user("alice"))
        .await
        .unwrap();
    assert_eq!(message, POST_DELETED);

    let err = h.service.get_post(post.id).await.unwrap_err();
    assert!(matches!(err, PostError::NotFound(_)));
}

#[tokio::test]
async fn test_non_author_cannot_delete() {
    let h = TestHarness::new();
    let post = h.service.create_post("mine", &h.as_user("alice")).await.unwrap();
    let post = h.service.like_post(post.id, &h.as_user("bob")).await.unwrap();

    let err = h
        .service
        .delete_post(post.id, &h.as_user("mallory"))
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::PermissionDenied(_)));

    let stored = h.service.get_post(post.id).await.unwrap();
    assert_eq!(stored, post);
    assert_eq!(
        serde_json::to_vec(&stored).unwrap(),
        serde_json::to_vec(&post).unwrap()
    );
}

#[tokio::test]
async fn test_same_username_different_id_counts_as_author() {
    let h = TestHarness::new();
    let post = h.service.create_post("mine", &h.as_user("alice")).await.unwrap();

    let other_device = h
        .gate
        .issue_token(&Identity::new("another-id", "alice"), None)
        .unwrap();

    h.service
        .delete_post(post.id, &RequestContext::bearer(&other_device))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_post_is_not_found() {
    let h = TestHarness::new();

    let err = h.service.get_post(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PostError::NotFound(_)));

    let err = parse_post_id("does-not-exist").unwrap_err();
    assert!(matches!(err, PostError::NotFound(_)));

    let err = h
        .service
        .delete_post(Uuid::new_v4(), &h.as_user("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::NotFound(_)));
}

#[tokio::test]
async fn test_mutations_require_identity() {
    let h = TestHarness::new();
    let post = h.service.create_post("hello", &h.as_user("alice")).await.unwrap();
    let anonymous = RequestContext::anonymous();
    let forged = RequestContext::bearer("not-a-jwt");

    for ctx in [&anonymous, &forged] {
        assert!(matches!(
            h.service.create_post("x", ctx).await,
            Err(PostError::Unauthenticated(_))
        ));
        assert!(matches!(
            h.service.like_post(post.id, ctx).await,
            Err(PostError::Unauthenticated(_))
        ));
        assert!(matches!(
            h.service.delete_post(post.id, ctx).await,
            Err(PostError::Unauthenticated(_))
        ));
    }

    // nothing changed
    assert_eq!(h.store.len().await, 1);
    assert_eq!(h.service.get_post(post.id).await.unwrap(), post);
}

#[tokio::test]
async fn test_list_posts_newest_first_regardless_of_insertion() {
    let h = TestHarness::new();
    let alice = Identity::new("id-alice", "alice");
    let now = Utc::now();

    for (body, minutes_ago) in [("third", 20), ("first", 0), ("fourth", 30), ("second", 10)] {
        h.store
            .save(Post::new(body, &alice, now - Duration::minutes(minutes_ago)))
            .await
            .unwrap();
    }

    let bodies: Vec<_> = h
        .service
        .list_posts()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.body)
        .collect();
    assert_eq!(bodies, vec!["first", "second", "third", "fourth"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_by_same_user_serialize() {
    let h = TestHarness::new();

    for _ in 0..25 {
        let post = h.service.create_post("race", &h.as_user("alice")).await.unwrap();
        let carol = h.as_user("carol");

        let (first, second) = tokio::join!(
            h.service.like_post(post.id, &carol),
            h.service.like_post(post.id, &carol)
        );
        let results = [first.unwrap(), second.unwrap()];

        // one call saw the like applied, the other saw it removed
        let liked = results
            .iter()
            .filter(|p| p.likes.iter().any(|l| l.username == "carol"))
            .count();
        assert_eq!(liked, 1);

        let stored = h.service.get_post(post.id).await.unwrap();
        assert!(stored.likes.iter().filter(|l| l.username == "carol").count() <= 1);
        assert!(stored.likes.is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_likes_by_different_users_are_not_lost() {
    let h = TestHarness::new();
    let post = h.service.create_post("popular", &h.as_user("alice")).await.unwrap();

    let users: Vec<String> = (0..32).map(|i| format!("user{}", i)).collect();
    let contexts: Vec<_> = users.iter().map(|u| h.as_user(u)).collect();

    let results = join_all(
        contexts
            .iter()
            .map(|ctx| h.service.like_post(post.id, ctx)),
    )
    .await;
    assert!(results.iter().all(|r| r.is_ok()));

    let stored = h.service.get_post(post.id).await.unwrap();
    assert_eq!(stored.likes.len(), users.len());
    for user in &users {
        assert_eq!(stored.likes.iter().filter(|l| &l.username == user).count(), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_like_racing_delete_does_not_resurrect_post() {
    let h = TestHarness::new();

    for _ in 0..25 {
        let post = h.service.create_post("short-lived", &h.as_user("alice")).await.unwrap();
        let alice = h.as_user("alice");
        let bob = h.as_user("bob");

        let (deleted, _liked) = tokio::join!(
            h.service.delete_post(post.id, &alice),
            h.service.like_post(post.id, &bob)
        );
        deleted.unwrap();

        assert!(matches!(
            h.service.get_post(post.id).await,
            Err(PostError::NotFound(_))
        ));
    }
}
