/// Error types for post-service
///
/// `PostError` is what every `PostService` operation returns. `StoreError` is
/// the narrower failure type of the `PostStore` contract; the service turns it
/// into `PostError::NotFound` or `PostError::StoreFailure`.
use async_graphql::ErrorExtensions;
use thiserror::Error;
use uuid::Uuid;

/// Result type for post-service operations
pub type Result<T> = std::result::Result<T, PostError>;

#[derive(Error, Debug)]
pub enum PostError {
    /// No or invalid identity for an identity-requiring operation
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Delete attempted by someone other than the author
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Store failure during {operation}: {source}")]
    StoreFailure {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl PostError {
    /// Wrap a store error, keeping `NotFound` distinguishable
    pub fn from_store(operation: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => PostError::NotFound(format!("Post not found: {}", id)),
            source => PostError::StoreFailure { operation, source },
        }
    }

    /// Machine-readable code used in GraphQL error extensions
    pub fn code(&self) -> &'static str {
        match self {
            PostError::Unauthenticated(_) => "UNAUTHENTICATED",
            PostError::NotFound(_) => "NOT_FOUND",
            PostError::PermissionDenied(_) => "FORBIDDEN",
            PostError::StoreFailure { .. } => "INTERNAL_SERVER_ERROR",
            PostError::ValidationError(_) => "BAD_USER_INPUT",
        }
    }
}

impl ErrorExtensions for PostError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        // Backend details stay in the logs
        let message = match self {
            PostError::StoreFailure { operation, .. } => {
                format!("Store failure during {}", operation)
            }
            other => other.to_string(),
        };

        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}

/// Failures of the `PostStore` contract
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Post not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Backend(String),
}
