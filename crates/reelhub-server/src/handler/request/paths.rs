//! Path parameter types for HTTP handlers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Path parameters for channel operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPathParams {
    /// Username of the channel owner.
    pub username: String,
}

/// Path parameters for video operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPathParams {
    /// Unique identifier of the video.
    pub video_id: Uuid,
}
