//! Utility modules for common functionality across the crate.

pub mod tracing_targets;

/// Name of the cookie carrying the access credential.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Name of the cookie carrying the refresh credential.
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Maximum accepted request body size in bytes.
pub const DEFAULT_MAX_BODY_SIZE: usize = 16 * 1024;
