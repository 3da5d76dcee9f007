//! Access credential verification for protected routes.
//!
//! The access credential is read from the `accessToken` cookie, or from an
//! `Authorization: Bearer` header when no cookie is present. It is verified
//! with the access key only, and its subject is loaded from the store.
//! Access credentials are stateless: they are not compared with anything
//! stored, so they stay valid until they expire even after logout.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::extract::CookieJar;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use derive_more::Deref;
use jiff::Timestamp;
use reelhub_store::StoreClient;
use reelhub_store::model::User;
use reelhub_store::query::UserRepository;
use uuid::Uuid;

use crate::handler::{Error, ErrorKind, Result};
use crate::service::{SessionKeys, TokenKind};
use crate::utility::ACCESS_TOKEN_COOKIE;
use crate::utility::tracing_targets::AUTHENTICATION as TRACING_TARGET;

/// The caller resolved from a verified access credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSubject {
    /// The user the credential was issued to, as currently stored.
    pub user: User,
    /// Unique id of the presented credential.
    pub token_id: Uuid,
    /// Expiry of the presented credential.
    pub expires_at: Timestamp,
}

impl AuthSubject {
    /// Returns the id of the authenticated user.
    #[inline]
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}

/// Authenticated caller extractor.
///
/// Rejects with `unauthenticated` when the credential is missing, malformed,
/// signed with the wrong key, expired, or names a user that no longer
/// exists. Store failures are reported as such. The resolved subject is
/// cached in the request extensions, so a route guarded by
/// [`require_authentication`] verifies the credential once.
///
/// [`require_authentication`]: crate::middleware::require_authentication
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthState(pub AuthSubject);

impl AuthState {
    /// Verifies `token` as an access credential and loads its subject.
    pub async fn from_access_token(
        token: &str,
        session_keys: &SessionKeys,
        store: &StoreClient,
    ) -> Result<Self> {
        let claims = session_keys
            .verify(token, TokenKind::Access)
            .map_err(|_| unauthenticated("Access token is invalid or expired"))?;

        let Some(user) = store.find_user_by_id(claims.subject_id).await? else {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id = %claims.subject_id,
                token_id = %claims.token_id,
                "authentication failed: user referenced in token no longer exists"
            );
            return Err(unauthenticated("User no longer exists"));
        };

        tracing::debug!(
            target: TRACING_TARGET,
            user_id = %user.id,
            token_id = %claims.token_id,
            "request authenticated"
        );

        Ok(Self(AuthSubject {
            user,
            token_id: claims.token_id,
            expires_at: claims.expires_at,
        }))
    }
}

/// Reads the access credential from the cookie, then from the bearer header.
async fn presented_access_token<S>(parts: &mut Parts, state: &S) -> Result<String>
where
    S: Send + Sync,
{
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE)
        && !cookie.value().is_empty()
    {
        return Ok(cookie.value().to_owned());
    }

    type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
    match <AuthBearerHeader as FromRequestParts<S>>::from_request_parts(parts, state).await {
        Ok(TypedHeader(Authorization(bearer))) => Ok(bearer.token().to_owned()),
        Err(rejection) => match rejection.reason() {
            TypedHeaderRejectionReason::Missing => Err(unauthenticated("Access token is required")),
            _ => Err(unauthenticated("Authorization header must carry a Bearer token")),
        },
    }
}

fn unauthenticated(message: &'static str) -> Error<'static> {
    ErrorKind::Unauthenticated
        .with_message(message)
        .with_resource("authentication")
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send + 'static,
    StoreClient: FromRef<S>,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let token = presented_access_token(parts, state).await?;
        let session_keys = SessionKeys::from_ref(state);
        let store = StoreClient::from_ref(state);
        let auth_state = Self::from_access_token(&token, &session_keys, &store).await?;

        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Request, header};
    use jiff::SignedDuration;
    use reelhub_store::model::NewUser;

    use super::*;
    use crate::service::{ServiceConfig, ServiceState};

    async fn state_with_user() -> anyhow::Result<(ServiceState, Uuid)> {
        let state = ServiceState::from_config(&ServiceConfig::default())?;
        let user = state
            .store
            .create_user(NewUser {
                username: "alice".into(),
                email: "alice@x.com".into(),
                full_name: "Alice".into(),
                password_hash: state.password_hasher.hash_password("secret123")?,
            })
            .await?;
        Ok((state, user.id))
    }

    async fn extract(state: &ServiceState, request: Request<()>) -> Result<AuthState> {
        let (mut parts, _) = request.into_parts();
        <AuthState as FromRequestParts<ServiceState>>::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn accepts_cookie_and_bearer() -> anyhow::Result<()> {
        let (state, user_id) = state_with_user().await?;
        let pair = state.session_keys.issue_pair(user_id)?;

        let request = Request::builder()
            .header(header::COOKIE, format!("accessToken={}", pair.access_token))
            .body(())?;
        assert_eq!(extract(&state, request).await?.user_id(), user_id);

        let request = Request::builder()
            .header(header::AUTHORIZATION, format!("Bearer {}", pair.access_token))
            .body(())?;
        assert_eq!(extract(&state, request).await?.user_id(), user_id);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_missing_refresh_and_expired_tokens() -> anyhow::Result<()> {
        let (state, user_id) = state_with_user().await?;
        let pair = state.session_keys.issue_pair(user_id)?;
        let expired =
            state
                .session_keys
                .issue(user_id, TokenKind::Access, SignedDuration::from_secs(-1))?;

        let missing = Request::builder().body(())?;
        let refresh = Request::builder()
            .header(header::AUTHORIZATION, format!("Bearer {}", pair.refresh_token))
            .body(())?;
        let expired = Request::builder()
            .header(header::COOKIE, format!("accessToken={}", expired.token))
            .body(())?;

        for request in [missing, refresh, expired] {
            let error = extract(&state, request).await.unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Unauthenticated);
        }
        Ok(())
    }

    #[tokio::test]
    async fn rejects_token_of_unknown_user() -> anyhow::Result<()> {
        let (state, _) = state_with_user().await?;
        let pair = state.session_keys.issue_pair(Uuid::now_v7())?;

        let request = Request::builder()
            .header(header::COOKIE, format!("accessToken={}", pair.access_token))
            .body(())?;
        let error = extract(&state, request).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Unauthenticated);
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_is_not_unauthenticated() -> anyhow::Result<()> {
        let (state, user_id) = state_with_user().await?;
        let pair = state.session_keys.issue_pair(user_id)?;
        state.store.close();

        let request = Request::builder()
            .header(header::COOKIE, format!("accessToken={}", pair.access_token))
            .body(())?;
        let error = extract(&state, request).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::StorageFailure);
        Ok(())
    }
}
