//! Records held by the store.
//!
//! ## Models
//!
//! - [`User`] - subject record with its single stored refresh credential
//! - [`Video`] - published video metadata
//! - [`Subscription`] - subscriber to channel link

mod subscription;
pub(crate) mod user;
mod video;

pub use subscription::{ChannelStats, Subscription};
pub use user::{NewUser, UpdateUser, User};
pub use video::{NewVideo, Video};
