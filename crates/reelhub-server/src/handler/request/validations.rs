//! Request validation utilities.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidationError;

/// Lowercase username: letters, digits, underscores and dots.
static USERNAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_.]{3,32}$").ok());

pub fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(validation_error("blank", "must not be blank"));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let normalized = username.trim().to_lowercase();
    let matches = USERNAME_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(&normalized));

    if !matches {
        return Err(validation_error(
            "username_format",
            "must be 3 to 32 characters of letters, digits, '_' or '.'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("Alice.B_2").is_ok());
        assert!(validate_username(" alice ").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_username("alice bob").is_err());
        assert!(validate_username("alice@x").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn blank_values_are_rejected() {
        assert!(validate_not_blank("Alice").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }
}
