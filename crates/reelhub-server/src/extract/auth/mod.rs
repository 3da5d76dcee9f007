//! Request authentication.
//!
//! - [`AuthState`] - extractor that resolves the caller from an access credential
//! - [`AuthSubject`] - the resolved caller handed to handlers

mod auth_state;

pub use self::auth_state::{AuthState, AuthSubject};
