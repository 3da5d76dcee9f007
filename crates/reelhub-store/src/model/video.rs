//! Video metadata model.

use jiff::Timestamp;
use uuid::Uuid;

/// Published video metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub id: Uuid,
    /// The user (channel) that published the video.
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    /// Location of the media file in external storage.
    pub video_url: String,
    /// Location of the thumbnail image in external storage.
    pub thumbnail_url: String,
    /// Length of the video in seconds.
    pub duration_secs: u32,
    /// Number of times the video has been fetched by id.
    pub views: u64,
    pub created_at: Timestamp,
}

/// Data for publishing a new video.
#[derive(Debug, Default, Clone)]
pub struct NewVideo {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_secs: u32,
}
