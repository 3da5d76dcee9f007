//! Video repository for published media metadata and watch history.

use std::future::Future;

use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{NewVideo, Video};
use crate::{StoreClient, StoreError, StoreResult, TRACING_TARGET_QUERY};

/// Repository for video operations.
pub trait VideoRepository {
    /// Publishes a new video owned by `new_video.owner_id`.
    ///
    /// Fails with [`StoreError::NotFound`] when the owner does not exist.
    ///
    /// [`StoreError::NotFound`]: crate::StoreError::NotFound
    fn create_video(&self, new_video: NewVideo)
    -> impl Future<Output = StoreResult<Video>> + Send;

    /// Finds a video by its unique identifier.
    fn find_video_by_id(
        &self,
        video_id: Uuid,
    ) -> impl Future<Output = StoreResult<Option<Video>>> + Send;

    /// Counts a view of a video and records it in the viewer's watch history.
    ///
    /// The video moves to the front of the history and appears there only
    /// once. Returns `None` when the video does not exist.
    fn record_video_view(
        &self,
        video_id: Uuid,
        viewer_id: Uuid,
    ) -> impl Future<Output = StoreResult<Option<Video>>> + Send;

    /// Lists the videos a user has watched, most recent first.
    ///
    /// Videos that no longer exist are skipped.
    fn list_watch_history(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = StoreResult<Vec<Video>>> + Send;
}

impl VideoRepository for StoreClient {
    async fn create_video(&self, new_video: NewVideo) -> StoreResult<Video> {
        let mut tables = self.write("create_video").await?;
        tables.user_mut(new_video.owner_id)?;

        let video = Video {
            id: Uuid::now_v7(),
            owner_id: new_video.owner_id,
            title: new_video.title.trim().to_owned(),
            description: new_video.description.trim().to_owned(),
            video_url: new_video.video_url,
            thumbnail_url: new_video.thumbnail_url,
            duration_secs: new_video.duration_secs,
            views: 0,
            created_at: Timestamp::now(),
        };
        tables.videos.insert(video.id, video.clone());

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            video_id = %video.id,
            owner_id = %video.owner_id,
            "video created"
        );

        Ok(video)
    }

    async fn find_video_by_id(&self, video_id: Uuid) -> StoreResult<Option<Video>> {
        let tables = self.read("find_video_by_id").await?;
        Ok(tables.videos.get(&video_id).cloned())
    }

    async fn record_video_view(&self, video_id: Uuid, viewer_id: Uuid) -> StoreResult<Option<Video>> {
        let mut tables = self.write("record_video_view").await?;
        tables.user_mut(viewer_id)?;

        let Some(video) = tables.videos.get_mut(&video_id) else {
            return Ok(None);
        };
        video.views = video.views.saturating_add(1);
        let video = video.clone();

        let viewer = tables.user_mut(viewer_id)?;
        viewer.watch_history.retain(|id| *id != video_id);
        viewer.watch_history.insert(0, video_id);

        Ok(Some(video))
    }

    async fn list_watch_history(&self, user_id: Uuid) -> StoreResult<Vec<Video>> {
        let tables = self.read("list_watch_history").await?;
        let user = tables.users.get(&user_id).ok_or(StoreError::NotFound {
            entity: "user",
            id: user_id,
        })?;

        Ok(user
            .watch_history
            .iter()
            .filter_map(|id| tables.videos.get(id).cloned())
            .collect())
    }
}
