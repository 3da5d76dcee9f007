//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust
//! use axum::routing::get;
//! use axum::Router;
//! use reelhub_server::handler::{routes, CustomRoutes};
//! use reelhub_server::service::{ServiceConfig, ServiceState};
//!
//! async fn custom_handler() -> &'static str {
//!     "Hello from custom route!"
//! }
//!
//! # fn example() -> anyhow::Result<()> {
//! let state = ServiceState::from_config(&ServiceConfig::default())?;
//!
//! let custom_routes = CustomRoutes::new()
//!     .with_private_routes(Router::new().route("/custom-private", get(custom_handler)))
//!     .with_public_routes(Router::new().route("/custom-public", get(custom_handler)));
//!
//! let router: Router = routes(custom_routes, state.clone()).with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod authentication;
mod custom_routes;
mod error;
mod request;
mod response;
mod users;
mod videos;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};

pub use crate::handler::custom_routes::CustomRoutes;
pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::ErrorResponse;
use crate::middleware::require_authentication;
use crate::service::ServiceState;

/// Prefix under which every API route is served.
pub const API_PREFIX: &str = "/api/v1";

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all private routes.
fn private_routes(additional_routes: Option<Router<ServiceState>>) -> Router<ServiceState> {
    let mut router = Router::new()
        .merge(authentication::private_routes())
        .merge(users::private_routes())
        .merge(videos::private_routes());

    if let Some(additional) = additional_routes {
        router = router.merge(additional);
    }

    router
}

/// Returns a [`Router`] with all public routes.
fn public_routes(additional_routes: Option<Router<ServiceState>>) -> Router<ServiceState> {
    let mut router = Router::new().merge(authentication::public_routes());

    if let Some(additional) = additional_routes {
        router = router.merge(additional);
    }

    router
}

/// Returns a [`Router`] with all routes nested under [`API_PREFIX`].
pub fn routes(routes: CustomRoutes, state: ServiceState) -> Router<ServiceState> {
    let require_authentication = from_fn_with_state(state, require_authentication);

    // Private routes with authentication middleware
    let private_router =
        private_routes(routes.private_routes).route_layer(require_authentication);

    // Public routes without authentication
    let public_router = public_routes(routes.public_routes);

    let api = Router::new().merge(private_router).merge(public_router);

    Router::new().nest(API_PREFIX, api).fallback(handler)
}
