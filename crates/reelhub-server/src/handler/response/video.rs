//! Video response types.

use jiff::Timestamp;
use reelhub_store::model::{User, Video};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publisher of a video.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOwner {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
}

impl From<User> for VideoOwner {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
        }
    }
}

/// Published video metadata.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    /// Length of the video in seconds.
    pub duration: u32,
    pub views: u64,
    /// The user who published the video. Absent if that user no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<VideoOwner>,
    pub created_at: Timestamp,
}

impl VideoResponse {
    /// Creates a new instance of [`VideoResponse`].
    pub fn new(video: Video, owner: Option<User>) -> Self {
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            duration: video.duration_secs,
            views: video.views,
            owner: owner.map(VideoOwner::from),
            created_at: video.created_at,
        }
    }
}
