//! Channel subscription model.

use jiff::Timestamp;
use uuid::Uuid;

/// A user subscribed to another user's channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    /// The user who subscribes.
    pub subscriber_id: Uuid,
    /// The channel being subscribed to.
    pub channel_id: Uuid,
    pub created_at: Timestamp,
}

/// Subscription counters of a channel as seen by one viewer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStats {
    /// Number of users subscribed to the channel.
    pub subscriber_count: u64,
    /// Number of channels the channel owner is subscribed to.
    pub subscribed_to_count: u64,
    /// Whether the viewer is subscribed to the channel.
    pub is_subscribed: bool,
}
