//! Configuration for Post Service
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Post storage configuration
    pub store: StoreConfig,

    /// Post creation rules
    pub posts: PostPolicy,

    /// GraphQL configuration
    pub graphql: GraphQLConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub expiry_seconds: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("expiry_seconds", &self.expiry_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => Err(anyhow!(
                "Unknown POST_STORE '{}', expected 'memory' or 'postgres'",
                other
            )),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Rules applied to new posts before they are persisted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPolicy {
    /// Reject bodies that are empty after trimming whitespace
    pub reject_empty_body: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// Enable introspection
    pub introspection: bool,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let store = Self::store_from_env()?;

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("SERVER_PORT", 8080)?,
                workers: Self::workers_from_env()?,
            },
            jwt: Self::jwt_from_env()?,
            store,
            posts: PostPolicy {
                reject_empty_body: parse_env_or("POSTS_REJECT_EMPTY_BODY", false)?,
            },
            graphql: GraphQLConfig {
                introspection: parse_env_or("GRAPHQL_INTROSPECTION", true)?,
            },
        })
    }

    /// Load JWT configuration from environment variables
    fn jwt_from_env() -> Result<JwtConfig> {
        let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.trim().is_empty() {
            return Err(anyhow!("JWT_SECRET must not be empty"));
        }

        let issuer = env::var("JWT_ISSUER")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let expiry_seconds: i64 = parse_env_or("JWT_EXPIRY_SECONDS", 3600)?;
        if expiry_seconds <= 0 {
            return Err(anyhow!(
                "JWT_EXPIRY_SECONDS must be positive, got {}",
                expiry_seconds
            ));
        }

        Ok(JwtConfig {
            secret,
            issuer,
            expiry_seconds,
        })
    }

    fn workers_from_env() -> Result<usize> {
        let workers = parse_env_or("SERVER_WORKERS", num_cpus::get())?;
        if workers == 0 {
            return Err(anyhow!("SERVER_WORKERS must be at least 1"));
        }
        Ok(workers)
    }

    fn store_from_env() -> Result<StoreConfig> {
        let backend = match env::var("POST_STORE") {
            Ok(value) => value.parse()?,
            Err(_) => StoreBackend::Memory,
        };

        let database_url = env::var("DATABASE_URL").ok();
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set when POST_STORE=postgres"));
        }

        Ok(StoreConfig {
            backend,
            database_url,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", 10)?,
        })
    }
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| anyhow!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
