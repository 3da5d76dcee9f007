//! User and session request types.

use reelhub_store::model::{NewUser, UpdateUser};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::validations::{validate_not_blank, validate_username, validation_error};

/// Request payload for registration.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    /// Display name.
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub full_name: String,

    /// Unique handle, stored lowercase.
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    /// Unique email address, stored lowercase.
    #[validate(email, length(max = 254))]
    pub email: String,

    /// Plaintext password, hashed before storage.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

impl RegisterUser {
    /// Converts this request into a store model with the given password hash.
    pub fn into_model(self, password_hash: String) -> NewUser {
        NewUser {
            username: self.username,
            email: self.email,
            full_name: self.full_name.trim().to_owned(),
            password_hash,
        }
    }
}

/// Request payload for login. Either `username` or `email` identifies the user.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_login_identifier"))]
pub struct LoginUser {
    /// Username of the account.
    #[validate(length(max = 254))]
    pub username: Option<String>,

    /// Email address of the account.
    #[validate(length(max = 254))]
    pub email: Option<String>,

    /// Password of the account.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

impl LoginUser {
    /// Returns the non-blank identifiers to look the user up by, username first.
    pub fn identifiers(&self) -> Vec<&str> {
        [self.username.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .filter(|value| !value.trim().is_empty())
            .collect()
    }
}

fn validate_login_identifier(request: &LoginUser) -> Result<(), ValidationError> {
    if request.identifiers().is_empty() {
        return Err(validation_error(
            "identifier_required",
            "Username or email is required",
        ));
    }
    Ok(())
}

/// Request payload for refreshing a session when the cookie is unavailable.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSession {
    /// The refresh credential issued by the last login or refresh.
    pub refresh_token: Option<String>,
}

/// Request payload for changing the password.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    /// Current password.
    #[validate(length(min = 1, max = 128))]
    pub old_password: String,

    /// New password.
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Request payload for updating account details.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_account_update"))]
pub struct UpdateAccount {
    /// New display name.
    #[validate(length(max = 100), custom(function = "validate_not_blank"))]
    pub full_name: Option<String>,

    /// New email address.
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
}

impl UpdateAccount {
    /// Converts this request into a store model.
    pub fn into_model(self) -> UpdateUser {
        UpdateUser {
            full_name: self.full_name,
            email: self.email,
            password_hash: None,
        }
    }
}

fn validate_account_update(request: &UpdateAccount) -> Result<(), ValidationError> {
    if request.full_name.is_none() && request.email.is_none() {
        return Err(validation_error(
            "update_empty",
            "At least one of fullName or email is required",
        ));
    }
    Ok(())
}
