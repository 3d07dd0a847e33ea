//! Shared fixtures: an in-memory service wired to a real JWT gate

#![allow(dead_code)]

use std::sync::Arc;

use post_service::config::{GraphQLConfig, JwtConfig, PostPolicy};
use post_service::db::InMemoryPostStore;
use post_service::middleware::{JwtAuthGate, RequestContext};
use post_service::models::Identity;
use post_service::schema::{build_schema, AppSchema};
use post_service::services::{NotificationBus, PostService};

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestHarness {
    pub store: InMemoryPostStore,
    pub gate: Arc<JwtAuthGate>,
    pub service: Arc<PostService>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_policy(PostPolicy::default())
    }

    pub fn with_policy(policy: PostPolicy) -> Self {
        let store = InMemoryPostStore::new();
        let gate = Arc::new(JwtAuthGate::new(&JwtConfig {
            secret: TEST_SECRET.to_string(),
            issuer: None,
            expiry_seconds: 3600,
        }));
        let service = Arc::new(PostService::with_policy(
            Arc::new(store.clone()),
            gate.clone(),
            NotificationBus::new(),
            policy,
        ));

        Self {
            store,
            gate,
            service,
        }
    }

    pub fn token_for(&self, username: &str) -> String {
        let identity = Identity::new(format!("id-{}", username), username);
        self.gate
            .issue_token(&identity, Some(&format!("{}@example.com", username)))
            .unwrap()
    }

    /// Request context carrying a valid bearer token for `username`
    pub fn as_user(&self, username: &str) -> RequestContext {
        RequestContext::bearer(&self.token_for(username))
    }

    pub fn schema(&self) -> AppSchema {
        build_schema(
            self.service.clone(),
            &GraphQLConfig {
                introspection: true,
            },
        )
    }
}
