//! Domain service for user accounts.
//!
//! Handles creation (behind the admission gate), lookup, listing and blocking.

use thiserror::Error;

use crate::db::StoreError;
use crate::models::{Includes, NewUser, Tracking, User, UserFilter};

/// Errors specific to user account operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User with group code Admin already exists")]
    AdminConflict,

    #[error("Creating a user with login '{0}' is already in progress")]
    LoginInFlight(String),

    #[error("User with login '{0}' already exists")]
    LoginTaken(String),

    #[error("User {0} not found")]
    NotFound(i32),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for UserError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateLogin(login) => Self::LoginTaken(login),
            other => Self::Store(other.to_string()),
        }
    }
}

impl UserError {
    /// Conflicts are the outcomes a caller may see under concurrent use.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AdminConflict | Self::LoginInFlight(_) | Self::LoginTaken(_)
        )
    }
}

/// Domain service trait for user accounts.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates a user. Takes the creation timestamp itself and always starts
    /// the user `Active`.
    ///
    /// # Errors
    ///
    /// - [`UserError::InvalidInput`] if the candidate, login or password is missing.
    /// - [`UserError::AdminConflict`] if an Admin exists or is being created.
    /// - [`UserError::LoginInFlight`] if another creation holds the login.
    /// - [`UserError::LoginTaken`] if the login is already stored.
    async fn create_user(&self, candidate: Option<NewUser>) -> Result<User, UserError>;

    /// First user matching `filter`, ordered by id. `Ok(None)` when nothing matches.
    async fn get_user(
        &self,
        filter: &UserFilter,
        includes: Includes,
        tracking: Tracking,
    ) -> Result<Option<User>, UserError>;

    /// A page of users ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::InvalidInput`] if `skip` or `take` exceeds `i64::MAX`.
    async fn list_users(
        &self,
        filter: Option<&UserFilter>,
        skip: u64,
        take: u64,
        includes: Includes,
    ) -> Result<Vec<User>, UserError>;

    /// Marks the user's state `Blocked`. Blocking an already blocked user succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::NotFound`] if the user has no state record.
    async fn deactivate_user(&self, id: i32) -> Result<(), UserError>;
}
