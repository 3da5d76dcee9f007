//! Video request types.

use reelhub_store::model::NewVideo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::validations::validate_not_blank;

/// Request payload for publishing a video.
///
/// Media files are hosted elsewhere; the request carries their URLs.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublishVideo {
    /// Title of the video.
    #[validate(length(max = 200), custom(function = "validate_not_blank"))]
    pub title: String,

    /// Description of the video.
    #[validate(length(max = 5000), custom(function = "validate_not_blank"))]
    pub description: String,

    /// URL of the hosted video file.
    #[validate(url)]
    pub video_url: String,

    /// URL of the hosted thumbnail image.
    #[validate(url)]
    pub thumbnail_url: String,

    /// Duration in seconds.
    #[validate(range(min = 1))]
    pub duration: u32,
}

impl PublishVideo {
    /// Converts this request into a store model owned by `owner_id`.
    pub fn into_model(self, owner_id: Uuid) -> NewVideo {
        NewVideo {
            owner_id,
            title: self.title.trim().to_owned(),
            description: self.description.trim().to_owned(),
            video_url: self.video_url,
            thumbnail_url: self.thumbnail_url,
            duration_secs: self.duration,
        }
    }
}
