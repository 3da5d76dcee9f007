//! User and channel response types.

use jiff::Timestamp;
use reelhub_store::model::{ChannelStats, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a user. Never carries the password hash or refresh credential.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique identifier of the user.
    pub id: Uuid,
    /// Lowercase handle of the user.
    pub username: String,
    /// Lowercase email address of the user.
    pub email: String,
    /// Display name of the user.
    pub full_name: String,
    /// Timestamp when the user registered.
    pub created_at: Timestamp,
}

impl UserResponse {
    /// Creates a new instance of [`UserResponse`].
    pub fn new(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::new(user)
    }
}

/// Channel profile of a user as seen by the caller.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    /// Number of users subscribed to this channel.
    pub subscriber_count: u64,
    /// Number of channels this user is subscribed to.
    pub subscribed_to_count: u64,
    /// Whether the caller is subscribed to this channel.
    pub is_subscribed: bool,
}

impl ChannelResponse {
    /// Creates a new instance of [`ChannelResponse`].
    pub fn new(user: User, stats: ChannelStats) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            subscriber_count: stats.subscriber_count,
            subscribed_to_count: stats.subscribed_to_count,
            is_subscribed: stats.is_subscribed,
        }
    }
}
