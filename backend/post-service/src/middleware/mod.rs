//! Post Service Middleware

pub mod auth;

pub use auth::{AuthGate, Claims, JwtAuthGate, RequestContext};
