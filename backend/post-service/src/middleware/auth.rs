//! Caller authentication
//!
//! `AuthGate` turns the per-request `RequestContext` into an `Identity` or an
//! `Unauthenticated` error. The JWT implementation expects the
//! `Authorization: Bearer <token>` scheme with HS256-signed tokens.

use actix_web::{http::header::AUTHORIZATION, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::{PostError, Result};
use crate::models::Identity;

/// Credentials carried by one inbound call
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub authorization: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_authorization(value: impl Into<String>) -> Self {
        Self {
            authorization: Some(value.into()),
        }
    }

    pub fn bearer(token: &str) -> Self {
        Self::with_authorization(format!("Bearer {}", token))
    }

    /// Copy the Authorization header out of an HTTP request
    pub fn from_http(req: &HttpRequest) -> Self {
        let authorization = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        Self { authorization }
    }
}

/// Derives the caller identity from request context
pub trait AuthGate: Send + Sync {
    fn authenticate(&self, ctx: &RequestContext) -> Result<Identity>;
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
}

/// HS256 token gate
pub struct JwtAuthGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
    expiry_seconds: i64,
}

impl JwtAuthGate {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            expiry_seconds: config.expiry_seconds,
        }
    }

    /// Sign a token for `identity`, valid for the configured lifetime
    pub fn issue_token(&self, identity: &Identity, email: Option<&str>) -> Result<String> {
        self.issue_token_with_ttl(identity, email, self.expiry_seconds)
    }

    pub fn issue_token_with_ttl(
        &self,
        identity: &Identity,
        email: Option<&str>,
        ttl_seconds: i64,
    ) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: identity.id.clone(),
            username: identity.username.clone(),
            email: email.map(str::to_string),
            iss: self.issuer.clone(),
            exp: now.saturating_add(ttl_seconds).max(0) as usize,
            iat: now as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PostError::Unauthenticated(format!("Failed to sign token: {}", e)))
    }
}

impl AuthGate for JwtAuthGate {
    fn authenticate(&self, ctx: &RequestContext) -> Result<Identity> {
        let header = ctx.authorization.as_deref().ok_or_else(|| {
            PostError::Unauthenticated("Authorization header must be provided".to_string())
        })?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                PostError::Unauthenticated(
                    "Authentication token must be 'Bearer [token]'".to_string(),
                )
            })?;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                PostError::Unauthenticated("Invalid/Expired token".to_string())
            })?;

        Ok(Identity {
            id: token_data.claims.sub,
            username: token_data.claims.username,
        })
    }
}
