//! Centralized tracing target constants for structured logging.
//!
//! Targets shared by more than one module live here so that log output can
//! be filtered per concern, e.g. `RUST_LOG=reelhub_server::authentication=debug`.

/// Access credential extraction and verification for incoming requests.
pub const AUTHENTICATION: &str = "reelhub_server::authentication";

/// Error recovery including middleware errors and request failures.
pub const RECOVERY_ERROR: &str = "reelhub_server::recovery::error";

/// Panic recovery including handler panics and service failures.
pub const RECOVERY_PANIC: &str = "reelhub_server::recovery::panic";

/// Password hashing and verification operations.
pub const PASSWORD_HASHER: &str = "reelhub_server::password_hasher";

/// Session key management and credential signing operations.
pub const SESSION_KEYS: &str = "reelhub_server::session_keys";

/// Session lifecycle operations: login, refresh, logout and password change.
pub const SESSION: &str = "reelhub_server::session";

/// Store error translation into HTTP errors.
pub const STORE: &str = "reelhub_server::store";
