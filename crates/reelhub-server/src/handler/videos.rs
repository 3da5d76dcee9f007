//! Video publishing and viewing handlers.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use reelhub_store::StoreClient;
use reelhub_store::query::{UserRepository, VideoRepository};

use crate::extract::{AuthState, Json, Path, ValidateJson};
use crate::handler::request::{PublishVideo, VideoPathParams};
use crate::handler::response::VideoResponse;
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for video operations.
const TRACING_TARGET: &str = "reelhub_server::handler::videos";

/// Publishes video metadata owned by the caller.
#[tracing::instrument(skip_all)]
async fn publish_video(
    State(store): State<StoreClient>,
    AuthState(subject): AuthState,
    ValidateJson(request): ValidateJson<PublishVideo>,
) -> Result<(StatusCode, Json<VideoResponse>)> {
    let video = store
        .create_video(request.into_model(subject.user_id()))
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        video_id = %video.id,
        owner_id = %video.owner_id,
        "video published"
    );

    let response = VideoResponse::new(video, Some(subject.user));
    Ok((StatusCode::CREATED, Json(response)))
}

/// Returns a video and records the view in the caller's watch history.
#[tracing::instrument(skip_all)]
async fn get_video(
    State(store): State<StoreClient>,
    AuthState(subject): AuthState,
    Path(path_params): Path<VideoPathParams>,
) -> Result<Json<VideoResponse>> {
    let Some(video) = store
        .record_video_view(path_params.video_id, subject.user_id())
        .await?
    else {
        return Err(ErrorKind::NotFound
            .with_message("Video does not exist")
            .with_resource("video"));
    };

    let owner = store.find_user_by_id(video.owner_id).await?;
    Ok(Json(VideoResponse::new(video, owner)))
}

/// Returns a [`Router`] with all related routes.
pub fn private_routes() -> Router<ServiceState> {
    Router::new()
        .route("/videos", post(publish_video))
        .route("/videos/{videoId}", get(get_video))
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::handler::test::create_test_server;
    use crate::utility::ACCESS_TOKEN_COOKIE;

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

    async fn publish(server: &TestServer, access: &Cookie<'static>, title: &str) -> String {
        let response = server
            .post("/api/v1/videos")
            .add_cookie(access.clone())
            .json(&json!({
                "title": title,
                "description": "A short clip",
                "videoUrl": "https://cdn.example.com/v.mp4",
                "thumbnailUrl": "https://cdn.example.com/v.png",
                "duration": 42
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        body["id"].as_str().unwrap_or_default().to_owned()
    }

    #[tokio::test]
    async fn publish_video_is_owned_by_caller() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let alice = sign_in(&server, "alice").await;

        let response = server
            .post("/api/v1/videos")
            .add_cookie(alice.clone())
            .json(&json!({
                "title": "Intro",
                "description": "A short clip",
                "videoUrl": "https://cdn.example.com/v.mp4",
                "thumbnailUrl": "https://cdn.example.com/v.png",
                "duration": 42
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["owner"]["username"], "alice");
        assert_eq!(body["views"], 0);
        assert_eq!(body["duration"], 42);

        let response = server
            .post("/api/v1/videos")
            .add_cookie(alice)
            .json(&json!({
                "title": "Intro",
                "description": " ",
                "videoUrl": "not a url",
                "thumbnailUrl": "https://cdn.example.com/v.png",
                "duration": 0
            }))
            .await;
        response.assert_status_bad_request();
        Ok(())
    }

    #[tokio::test]
    async fn viewing_records_watch_history() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let alice = sign_in(&server, "alice").await;
        let bob = sign_in(&server, "bob").await;

        let first = publish(&server, &alice, "First").await;
        let second = publish(&server, &alice, "Second").await;

        for id in [&first, &second, &first] {
            server
                .get(&format!("/api/v1/videos/{id}"))
                .add_cookie(bob.clone())
                .await
                .assert_status_ok();
        }

        let response = server
            .get("/api/v1/users/watch-history")
            .add_cookie(bob)
            .await;
        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 2);
        assert_eq!(body[0]["id"], first.as_str());
        assert_eq!(body[0]["views"], 2);
        assert_eq!(body[0]["owner"]["username"], "alice");
        assert_eq!(body[1]["id"], second.as_str());
        Ok(())
    }

    #[tokio::test]
    async fn get_video_errors() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let alice = sign_in(&server, "alice").await;

        server
            .get("/api/v1/videos/0190a0b4-6d1e-7c3a-9f00-000000000000")
            .add_cookie(alice.clone())
            .await
            .assert_status_not_found();

        server
            .get("/api/v1/videos/not-a-uuid")
            .add_cookie(alice)
            .await
            .assert_status_bad_request();

        server
            .get("/api/v1/videos/not-a-uuid")
            .await
            .assert_status_unauthorized();
        Ok(())
    }
}
