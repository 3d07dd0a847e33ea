/// Post Service Library
///
/// Shared-post core: list, fetch, create, delete and like posts, with a live
/// `newPost` stream for subscribers.
///
/// # Modules
///
/// - `models`: Identity, Post, Like and the new-post event payload
/// - `middleware`: caller authentication (`AuthGate`, JWT implementation)
/// - `db`: `PostStore` contract with in-memory and PostgreSQL backends
/// - `services`: post orchestration, like toggling, notification fan-out
/// - `schema`: GraphQL query/mutation/subscription binding
/// - `handlers`: actix-web routes
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod schema;
pub mod services;

pub use config::Config;
pub use error::{PostError, Result, StoreError};
