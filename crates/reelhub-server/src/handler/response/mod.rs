//! Response types for HTTP handlers.

mod error_response;
mod session;
mod user;
mod video;

pub use error_response::ErrorResponse;
pub use session::{ChangePasswordResponse, LogoutResponse, SessionResponse};
pub use user::{ChannelResponse, UserResponse};
pub use video::VideoResponse;
