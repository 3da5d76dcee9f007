//! Extension points for the API router.

use axum::Router;

use crate::service::ServiceState;

/// Additional routes merged into the API router.
///
/// Private routes are placed behind the same authentication layer as the
/// built-in session routes; public routes are served as-is. Both are nested
/// under the API prefix.
#[derive(Debug, Default, Clone)]
pub struct CustomRoutes {
    /// Routes that require an authenticated caller.
    pub private_routes: Option<Router<ServiceState>>,
    /// Routes that are reachable without credentials.
    pub public_routes: Option<Router<ServiceState>>,
}

impl CustomRoutes {
    /// Creates an empty set of custom routes.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds private routes, merging with any already set.
    pub fn with_private_routes(mut self, routes: Router<ServiceState>) -> Self {
        self.private_routes = Some(match self.private_routes {
            Some(existing) => existing.merge(routes),
            None => routes,
        });
        self
    }

    /// Adds public routes, merging with any already set.
    pub fn with_public_routes(mut self, routes: Router<ServiceState>) -> Self {
        self.public_routes = Some(match self.public_routes {
            Some(existing) => existing.merge(routes),
            None => routes,
        });
        self
    }

    /// Returns true if no custom routes are configured.
    pub fn is_empty(&self) -> bool {
        self.private_routes.is_none() && self.public_routes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_routes_builder() {
        let routes = CustomRoutes::new();
        assert!(routes.is_empty());

        let routes = routes
            .with_private_routes(Router::new())
            .with_public_routes(Router::new())
            .with_public_routes(Router::new());
        assert!(routes.private_routes.is_some());
        assert!(routes.public_routes.is_some());
        assert!(!routes.is_empty());
    }
}
