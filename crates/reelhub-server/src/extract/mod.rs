//! Request extractors whose rejections render as [`Error`] responses.
//!
//! - [`AuthState`] - caller resolved from a verified access credential
//! - [`Json`] - JSON body and response
//! - [`ValidateJson`] - JSON body checked with `validator` rules
//! - [`Path`] - path parameters
//!
//! [`Error`]: crate::handler::Error

mod auth;
mod reject;

pub use crate::extract::auth::{AuthState, AuthSubject};
pub use crate::extract::reject::{Json, Path, ValidateJson};
