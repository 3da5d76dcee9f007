//! Store error to HTTP error conversion.

use reelhub_store::{StoreError, constraint};

use crate::handler::{Error, ErrorKind};
use crate::utility::tracing_targets::STORE as TRACING_TARGET;

impl From<StoreError> for Error<'static> {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict { constraint } => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    constraint,
                    "unique constraint violated"
                );

                match constraint {
                    constraint::USERS_USERNAME_KEY => ErrorKind::Conflict
                        .with_message("Username is already taken")
                        .with_resource("user"),
                    constraint::USERS_EMAIL_KEY => ErrorKind::Conflict
                        .with_message("Email is already registered")
                        .with_resource("user"),
                    _ => ErrorKind::Conflict.into_error(),
                }
            }
            StoreError::NotFound { entity, id } => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    entity,
                    id = %id,
                    "record not found"
                );
                ErrorKind::NotFound.with_resource(entity)
            }
            StoreError::Timeout { operation } => {
                tracing::error!(
                    target: TRACING_TARGET,
                    operation,
                    "store operation timed out"
                );
                ErrorKind::StorageFailure.with_context("Store operation timed out")
            }
            StoreError::Unavailable(reason) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    reason = %reason,
                    "store unavailable"
                );
                ErrorKind::StorageFailure.into_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn conflict_names_the_taken_field() {
        let error = Error::from(StoreError::Conflict {
            constraint: constraint::USERS_EMAIL_KEY,
        });
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(error.message(), Some("Email is already registered"));
    }

    #[test]
    fn not_found_keeps_entity() {
        let error = Error::from(StoreError::NotFound {
            entity: "user",
            id: Uuid::nil(),
        });
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.resource(), Some("user"));
    }

    #[test]
    fn outages_are_storage_failures() {
        let timeout = Error::from(StoreError::Timeout { operation: "login" });
        let closed = Error::from(StoreError::Unavailable("closed".into()));

        assert_eq!(timeout.kind(), ErrorKind::StorageFailure);
        assert_eq!(closed.kind(), ErrorKind::StorageFailure);
        assert_eq!(closed.kind().status_code().as_u16(), 503);
    }
}
