//! Request types for HTTP handlers.

mod paths;
mod users;
mod validations;
mod videos;

pub use paths::*;
pub use users::*;
pub use videos::*;
