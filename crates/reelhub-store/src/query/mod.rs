//! Store query repositories for all entities in the system.
//!
//! Each repository is a trait implemented for [`StoreClient`], so callers
//! import only the operations they need:
//!
//! ```ignore
//! use reelhub_store::query::UserRepository;
//!
//! let user = store.find_user_by_id(user_id).await?;
//! ```
//!
//! [`StoreClient`]: crate::StoreClient

pub mod session;
pub mod subscription;
pub mod user;
pub mod video;

pub use session::SessionRepository;
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;
pub use video::VideoRepository;
