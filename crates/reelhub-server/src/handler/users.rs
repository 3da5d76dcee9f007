//! Account, channel and watch history handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::{get, patch, post};
use reelhub_store::StoreClient;
use reelhub_store::model::User;
use reelhub_store::query::{SubscriptionRepository, UserRepository, VideoRepository};

use crate::extract::{AuthState, Json, Path, ValidateJson};
use crate::handler::request::{ChannelPathParams, UpdateAccount};
use crate::handler::response::{ChannelResponse, UserResponse, VideoResponse};
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for account operations.
const TRACING_TARGET: &str = "reelhub_server::handler::users";

/// Finds a channel owner by username.
async fn find_channel(store: &StoreClient, username: &str) -> Result<User> {
    store.find_user_by_username(username).await?.ok_or_else(|| {
        ErrorKind::NotFound
            .with_message("Channel does not exist")
            .with_resource("channel")
    })
}

/// Returns the profile of the caller.
#[tracing::instrument(skip_all)]
async fn current_user(AuthState(subject): AuthState) -> Result<Json<UserResponse>> {
    Ok(Json(UserResponse::new(subject.user)))
}

/// Updates the full name and/or email of the caller.
#[tracing::instrument(skip_all)]
async fn update_account(
    State(store): State<StoreClient>,
    AuthState(subject): AuthState,
    ValidateJson(request): ValidateJson<UpdateAccount>,
) -> Result<Json<UserResponse>> {
    let user = store
        .update_user(subject.user_id(), request.into_model())
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user.id,
        "account updated"
    );

    Ok(Json(UserResponse::new(user)))
}

/// Returns the channel profile of a user.
#[tracing::instrument(skip_all)]
async fn channel_profile(
    State(store): State<StoreClient>,
    AuthState(subject): AuthState,
    Path(path_params): Path<ChannelPathParams>,
) -> Result<Json<ChannelResponse>> {
    let channel = find_channel(&store, &path_params.username).await?;
    let stats = store
        .find_channel_stats(channel.id, subject.user_id())
        .await?;

    Ok(Json(ChannelResponse::new(channel, stats)))
}

/// Subscribes the caller to a channel.
#[tracing::instrument(skip_all)]
async fn subscribe(
    State(store): State<StoreClient>,
    AuthState(subject): AuthState,
    Path(path_params): Path<ChannelPathParams>,
) -> Result<Json<ChannelResponse>> {
    let channel = find_channel(&store, &path_params.username).await?;
    if channel.id == subject.user_id() {
        return Err(ErrorKind::BadRequest
            .with_message("You cannot subscribe to your own channel")
            .with_resource("subscription"));
    }

    store.subscribe(subject.user_id(), channel.id).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        subscriber_id = %subject.user_id(),
        channel_id = %channel.id,
        "subscribed to channel"
    );

    let stats = store
        .find_channel_stats(channel.id, subject.user_id())
        .await?;
    Ok(Json(ChannelResponse::new(channel, stats)))
}

/// Unsubscribes the caller from a channel.
#[tracing::instrument(skip_all)]
async fn unsubscribe(
    State(store): State<StoreClient>,
    AuthState(subject): AuthState,
    Path(path_params): Path<ChannelPathParams>,
) -> Result<Json<ChannelResponse>> {
    let channel = find_channel(&store, &path_params.username).await?;
    let removed = store.unsubscribe(subject.user_id(), channel.id).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        subscriber_id = %subject.user_id(),
        channel_id = %channel.id,
        removed,
        "unsubscribed from channel"
    );

    let stats = store
        .find_channel_stats(channel.id, subject.user_id())
        .await?;
    Ok(Json(ChannelResponse::new(channel, stats)))
}

/// Returns the videos the caller watched, most recent first.
#[tracing::instrument(skip_all)]
async fn watch_history(
    State(store): State<StoreClient>,
    AuthState(subject): AuthState,
) -> Result<Json<Vec<VideoResponse>>> {
    let videos = store.list_watch_history(subject.user_id()).await?;

    let mut response = Vec::with_capacity(videos.len());
    for video in videos {
        let owner = store.find_user_by_id(video.owner_id).await?;
        response.push(VideoResponse::new(video, owner));
    }

    Ok(Json(response))
}

/// Returns a [`Router`] with all related routes.
pub fn private_routes() -> Router<ServiceState> {
    Router::new()
        .route("/users/current-user", get(current_user))
        .route("/users/update-account", patch(update_account))
        .route("/users/c/{username}", get(channel_profile))
        .route(
            "/users/c/{username}/subscription",
            post(subscribe).delete(unsubscribe),
        )
        .route("/users/watch-history", get(watch_history))
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::handler::test::create_test_server;
    use crate::utility::ACCESS_TOKEN_COOKIE;

    /// Registers and logs in a user, returning its access cookie.
    async fn sign_in(server: &TestServer, username: &str) -> Cookie<'static> {
        server
            .post("/api/v1/users/register")
            .json(&json!({
                "fullName": username,
                "username": username,
                "email": format!("{username}@x.com"),
                "password": "secret123"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/api/v1/users/login")
            .json(&json!({ "username": username, "password": "secret123" }))
            .await
            .cookie(ACCESS_TOKEN_COOKIE)
    }

    #[tokio::test]
    async fn current_user_with_cookie_or_bearer() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let access = sign_in(&server, "alice").await;

        let response = server
            .get("/api/v1/users/current-user")
            .add_cookie(access.clone())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["username"], "alice");

        let response = server
            .get("/api/v1/users/current-user")
            .authorization_bearer(access.value())
            .await;
        response.assert_status_ok();

        server
            .get("/api/v1/users/current-user")
            .authorization_bearer("garbage")
            .await
            .assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    async fn update_account_changes_profile() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let access = sign_in(&server, "alice").await;
        sign_in(&server, "bob").await;

        let response = server
            .patch("/api/v1/users/update-account")
            .add_cookie(access.clone())
            .json(&json!({ "fullName": "Alice Liddell", "email": "Liddell@X.com" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["fullName"], "Alice Liddell");
        assert_eq!(body["email"], "liddell@x.com");

        let response = server
            .patch("/api/v1/users/update-account")
            .add_cookie(access.clone())
            .json(&json!({ "email": "bob@x.com" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        let response = server
            .patch("/api/v1/users/update-account")
            .add_cookie(access)
            .json(&json!({}))
            .await;
        response.assert_status_bad_request();
        Ok(())
    }

    #[tokio::test]
    async fn subscriptions_update_channel_profile() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let alice = sign_in(&server, "alice").await;
        let bob = sign_in(&server, "bob").await;

        let response = server
            .post("/api/v1/users/c/bob/subscription")
            .add_cookie(alice.clone())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["subscriberCount"], 1);
        assert_eq!(body["isSubscribed"], true);

        // Subscribing twice keeps a single subscription.
        server
            .post("/api/v1/users/c/bob/subscription")
            .add_cookie(alice.clone())
            .await
            .assert_status_ok();

        let response = server.get("/api/v1/users/c/alice").add_cookie(bob).await;
        let body: Value = response.json();
        assert_eq!(body["subscribedToCount"], 1);
        assert_eq!(body["isSubscribed"], false);

        let response = server
            .delete("/api/v1/users/c/bob/subscription")
            .add_cookie(alice.clone())
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["subscriberCount"], 0);
        assert_eq!(body["isSubscribed"], false);

        server
            .delete("/api/v1/users/c/bob/subscription")
            .add_cookie(alice)
            .await
            .assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn subscription_errors() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let alice = sign_in(&server, "alice").await;

        server
            .post("/api/v1/users/c/alice/subscription")
            .add_cookie(alice.clone())
            .await
            .assert_status_bad_request();

        server
            .get("/api/v1/users/c/nobody")
            .add_cookie(alice)
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[tokio::test]
    async fn watch_history_starts_empty() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let alice = sign_in(&server, "alice").await;

        let response = server
            .get("/api/v1/users/watch-history")
            .add_cookie(alice)
            .await;
        response.assert_status_ok();
        let body: Vec<Value> = response.json();
        assert!(body.is_empty());
        Ok(())
    }
}
