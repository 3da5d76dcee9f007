use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::extract::AuthState;

/// Requires a verified access credential to proceed with the request.
///
/// The resolved [`AuthState`] is cached in the request extensions, so
/// handlers behind this guard extract it again without re-verifying.
///
/// ```rust,no_run
/// use axum::Router;
/// use axum::middleware::from_fn_with_state;
/// use axum::routing::get;
/// use reelhub_server::middleware::require_authentication;
/// use reelhub_server::service::{ServiceConfig, ServiceState};
///
/// async fn profile() -> &'static str {
///     "private"
/// }
///
/// # fn main() -> reelhub_server::Result<()> {
/// let state = ServiceState::from_config(&ServiceConfig::default())?;
/// let router: Router = Router::<ServiceState>::new()
///     .route("/profile", get(profile))
///     .route_layer(from_fn_with_state(state.clone(), require_authentication))
///     .with_state(state);
/// # let _ = router;
/// # Ok(())
/// # }
/// ```
pub async fn require_authentication(
    AuthState(_): AuthState,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}
