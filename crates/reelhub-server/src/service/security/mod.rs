//! Credential services.
//!
//! Password hashing for stored account secrets and signing keys for the
//! access and refresh credentials that make up a session.

mod password_hasher;
mod session_keys;

pub use password_hasher::PasswordHasher;
pub use session_keys::{AuthClaims, IssuedToken, SessionKeys, TokenKind, TokenPair};
