//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Authentication: [`require_authentication`] guards private routes
//! - Recovery: panics and timeouts become `internal_server_error` responses
//! - Observability: request ids, request spans, sensitive header redaction
//! - Security: CORS, body size limit, response security headers
//!
//! ```rust,no_run
//! use axum::Router;
//! use reelhub_server::middleware::{
//!     RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
//! };
//!
//! let app: Router = Router::new()
//!     .with_default_security()
//!     .with_observability()
//!     .with_default_recovery();
//! ```

mod auth;
mod observability;
mod recovery;
mod security;

pub use auth::require_authentication;
pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, FrameOptions, ReferrerPolicy, RouterSecurityExt, SecurityHeadersConfig,
};
