//! Registration and session handlers.
//!
//! Login and refresh deliver both credentials as `HttpOnly` cookies only;
//! response bodies carry the user profile and expiry times, never a token.
//! Logout clears both cookies with the attributes they were set with.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use reelhub_store::StoreClient;
use reelhub_store::query::UserRepository;

use crate::extract::{AuthState, Json, ValidateJson};
use crate::handler::request::{ChangePassword, LoginUser, RefreshSession, RegisterUser};
use crate::handler::response::{
    ChangePasswordResponse, LogoutResponse, SessionResponse, UserResponse,
};
use crate::handler::Result;
use crate::service::{CookiePolicy, PasswordHasher, ServiceState, SessionService, TokenPair};
use crate::utility::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "reelhub_server::handler::authentication";

/// Builds a session cookie with the attributes shared by setting and clearing.
fn session_cookie(name: &'static str, value: String, policy: CookiePolicy) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(policy.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Adds both credentials of `token_pair` to the jar.
fn set_session_cookies(jar: CookieJar, policy: CookiePolicy, token_pair: &TokenPair) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        token_pair.access_token.clone(),
        policy,
    ))
    .add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        token_pair.refresh_token.clone(),
        policy,
    ))
}

/// Expires both credential cookies on the client, whether or not the
/// request carried them.
fn clear_session_cookies(jar: CookieJar, policy: CookiePolicy) -> CookieJar {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| {
            let mut cookie = session_cookie(name, String::new(), policy);
            cookie.make_removal();
            jar.add(cookie)
        })
}

/// Creates a new user.
#[tracing::instrument(skip_all)]
async fn register(
    State(store): State<StoreClient>,
    State(password_hasher): State<PasswordHasher>,
    ValidateJson(request): ValidateJson<RegisterUser>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    tracing::trace!(target: TRACING_TARGET, "registration attempt");

    let password_hash = password_hasher.hash_password(&request.password)?;
    let user = store.create_user(request.into_model(password_hash)).await?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user.id,
        "user registered"
    );

    Ok((StatusCode::CREATED, Json(UserResponse::new(user))))
}

/// Starts a session with a username or email and a password.
#[tracing::instrument(skip_all)]
async fn login(
    State(session_service): State<SessionService>,
    State(cookie_policy): State<CookiePolicy>,
    jar: CookieJar,
    ValidateJson(request): ValidateJson<LoginUser>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    tracing::trace!(target: TRACING_TARGET, "login attempt");

    let (user, token_pair) = session_service
        .login(&request.identifiers(), &request.password)
        .await?;

    let jar = set_session_cookies(jar, cookie_policy, &token_pair);
    Ok((jar, Json(SessionResponse::new(user, &token_pair))))
}

/// Rotates the session credentials.
///
/// The refresh credential is taken from the cookie, or from the
/// `refreshToken` body field when the cookie is absent.
#[tracing::instrument(skip_all)]
async fn refresh_token(
    State(session_service): State<SessionService>,
    State(cookie_policy): State<CookiePolicy>,
    jar: CookieJar,
    body: Option<Json<RefreshSession>>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
        .or_else(|| body.and_then(|Json(body)| body.refresh_token));

    let (user, token_pair) = session_service.refresh(presented.as_deref()).await?;

    let jar = set_session_cookies(jar, cookie_policy, &token_pair);
    Ok((jar, Json(SessionResponse::new(user, &token_pair))))
}

/// Ends the session of the caller.
#[tracing::instrument(skip_all)]
async fn logout(
    State(session_service): State<SessionService>,
    State(cookie_policy): State<CookiePolicy>,
    AuthState(subject): AuthState,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LogoutResponse>)> {
    session_service.logout(subject.user_id()).await?;

    let jar = clear_session_cookies(jar, cookie_policy);
    Ok((jar, Json(LogoutResponse { logged_out: true })))
}

/// Replaces the password of the caller.
#[tracing::instrument(skip_all)]
async fn change_password(
    State(session_service): State<SessionService>,
    AuthState(subject): AuthState,
    ValidateJson(request): ValidateJson<ChangePassword>,
) -> Result<Json<ChangePasswordResponse>> {
    session_service
        .change_password(
            subject.user_id(),
            &request.old_password,
            &request.new_password,
        )
        .await?;

    Ok(Json(ChangePasswordResponse {
        password_changed: true,
    }))
}

/// Returns a [`Router`] with routes that do not require authentication.
pub fn public_routes() -> Router<ServiceState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/refresh-token", post(refresh_token))
}

/// Returns a [`Router`] with routes that act on the caller's session.
pub fn private_routes() -> Router<ServiceState> {
    Router::new()
        .route("/users/logout", post(logout))
        .route("/users/change-password", post(change_password))
}
