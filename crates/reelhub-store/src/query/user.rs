//! User repository for managing registered subjects.

use std::future::Future;

use jiff::Timestamp;
use uuid::Uuid;

use crate::client::StoreTables;
use crate::model::user::normalize_key;
use crate::model::{NewUser, UpdateUser, User};
use crate::{StoreClient, StoreError, StoreResult, TRACING_TARGET_QUERY, constraint};

/// Repository for user operations.
///
/// Usernames and emails are stored trimmed and lowercased, and both are
/// unique across all users.
pub trait UserRepository {
    /// Registers a new user.
    ///
    /// Fails with [`StoreError::Conflict`] when the username or email is
    /// already taken.
    fn create_user(&self, new_user: NewUser) -> impl Future<Output = StoreResult<User>> + Send;

    /// Finds a user by its unique identifier.
    fn find_user_by_id(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Finds a user by username. Comparison is case-insensitive.
    fn find_user_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Finds a user whose username or email equals `identifier`.
    ///
    /// Username matches take precedence over email matches.
    fn find_user_by_username_or_email(
        &self,
        identifier: &str,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Applies a partial update to a user.
    ///
    /// Only fields set to `Some(value)` are modified. Fails with
    /// [`StoreError::NotFound`] when the user does not exist and with
    /// [`StoreError::Conflict`] when the new email belongs to another user.
    fn update_user(
        &self,
        user_id: Uuid,
        updates: UpdateUser,
    ) -> impl Future<Output = StoreResult<User>> + Send;
}

fn lookup(tables: &StoreTables, index: &str) -> Option<User> {
    tables
        .usernames
        .get(index)
        .or_else(|| tables.emails.get(index))
        .and_then(|id| tables.users.get(id))
        .cloned()
}

impl UserRepository for StoreClient {
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        let username = normalize_key(&new_user.username);
        let email = normalize_key(&new_user.email);

        let mut tables = self.write("create_user").await?;
        if tables.usernames.contains_key(&username) {
            return Err(StoreError::Conflict {
                constraint: constraint::USERS_USERNAME_KEY,
            });
        }
        if tables.emails.contains_key(&email) {
            return Err(StoreError::Conflict {
                constraint: constraint::USERS_EMAIL_KEY,
            });
        }

        let now = Timestamp::now();
        let user = User {
            id: Uuid::now_v7(),
            username: username.clone(),
            email: email.clone(),
            full_name: new_user.full_name.trim().to_owned(),
            password_hash: new_user.password_hash,
            refresh_token: None,
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        tables.usernames.insert(username, user.id);
        tables.emails.insert(email, user.id);
        tables.users.insert(user.id, user.clone());

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            user_id = %user.id,
            "user created"
        );

        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.read("find_user_by_id").await?;
        Ok(tables.users.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let username = normalize_key(username);
        let tables = self.read("find_user_by_username").await?;
        Ok(tables
            .usernames
            .get(&username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_user_by_username_or_email(&self, identifier: &str) -> StoreResult<Option<User>> {
        let identifier = normalize_key(identifier);
        let tables = self.read("find_user_by_username_or_email").await?;
        Ok(lookup(&tables, &identifier))
    }

    async fn update_user(&self, user_id: Uuid, mut updates: UpdateUser) -> StoreResult<User> {
        if let Some(name) = updates.full_name.as_mut() {
            *name = name.trim().to_owned();
        }
        if let Some(email) = updates.email.as_mut() {
            *email = normalize_key(email);
        }

        let mut tables = self.write("update_user").await?;
        let current_email = tables.user_mut(user_id)?.email.clone();

        if let Some(email) = updates.email.as_ref().filter(|e| **e != current_email) {
            if tables.emails.contains_key(email) {
                return Err(StoreError::Conflict {
                    constraint: constraint::USERS_EMAIL_KEY,
                });
            }
            tables.emails.remove(&current_email);
            tables.emails.insert(email.clone(), user_id);
        }

        let user = tables.user_mut(user_id)?;
        if let Some(full_name) = updates.full_name {
            user.full_name = full_name;
        }
        if let Some(email) = updates.email {
            user.email = email;
        }
        if let Some(password_hash) = updates.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Timestamp::now();

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            user_id = %user_id,
            "user updated"
        );

        Ok(user.clone())
    }
}
