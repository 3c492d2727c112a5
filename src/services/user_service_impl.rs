//! Store-backed implementation of the `UserService` trait.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::AccountsConfig;
use crate::db::UserStore;
use crate::models::{
    GroupCode, Includes, NewUser, StatusCode, Tracking, User, UserFilter, UserRecord,
};
use crate::services::admission::{AdmissionKey, AdmissionRegistry};
use crate::services::user_service::{UserError, UserService};

pub struct DefaultUserService {
    store: Arc<dyn UserStore>,
    admission: Arc<AdmissionRegistry>,
    creation_delay: Duration,
}

impl DefaultUserService {
    #[must_use]
    pub fn new(
        store: Arc<dyn UserStore>,
        admission: Arc<AdmissionRegistry>,
        creation_delay: Duration,
    ) -> Self {
        Self {
            store,
            admission,
            creation_delay,
        }
    }

    #[must_use]
    pub fn from_config(
        store: Arc<dyn UserStore>,
        admission: Arc<AdmissionRegistry>,
        config: &AccountsConfig,
    ) -> Self {
        Self::new(store, admission, config.creation_delay())
    }

    #[must_use]
    pub const fn admission(&self) -> &Arc<AdmissionRegistry> {
        &self.admission
    }
}

fn validate(candidate: Option<NewUser>) -> Result<NewUser, UserError> {
    let candidate =
        candidate.ok_or_else(|| UserError::InvalidInput("user is required".to_string()))?;

    if candidate.login.trim().is_empty() {
        return Err(UserError::InvalidInput("login is required".to_string()));
    }

    if candidate.password.trim().is_empty() {
        return Err(UserError::InvalidInput("password is required".to_string()));
    }

    Ok(candidate)
}

/// SQLite binds offsets and limits as `i64`.
fn check_page(skip: u64, take: u64) -> Result<(), UserError> {
    const MAX_PAGE_BOUND: u64 = i64::MAX.unsigned_abs();

    if skip > MAX_PAGE_BOUND {
        return Err(UserError::InvalidInput(format!(
            "skip must be at most {MAX_PAGE_BOUND}"
        )));
    }
    if take > MAX_PAGE_BOUND {
        return Err(UserError::InvalidInput(format!(
            "take must be at most {MAX_PAGE_BOUND}"
        )));
    }

    Ok(())
}

fn normalize(candidate: NewUser) -> UserRecord {
    if let Some(requested) = candidate.state.filter(|s| *s != StatusCode::Active) {
        debug!(login = %candidate.login, %requested, "Ignoring requested state, new users start Active");
    }

    UserRecord {
        login: candidate.login,
        password: candidate.password,
        created_at: Utc::now(),
        group: candidate.group,
        group_description: candidate.group_description,
        state: StatusCode::Active,
        state_description: candidate.state_description,
    }
}

#[async_trait]
impl UserService for DefaultUserService {
    async fn create_user(&self, candidate: Option<NewUser>) -> Result<User, UserError> {
        info!("Adding a user to the database");

        let record = normalize(validate(candidate)?);
        let is_admin = record.group == GroupCode::Admin;

        if is_admin && self.store.exists_admin_group_user().await? {
            warn!(login = %record.login, "Rejected: an Admin user already exists");
            return Err(UserError::AdminConflict);
        }

        let Some(login_reservation) = self
            .admission
            .try_reserve(AdmissionKey::login(&record.login))
        else {
            warn!(login = %record.login, "Rejected: creation already in progress");
            return Err(UserError::LoginInFlight(record.login));
        };
        debug!(key = %login_reservation.key(), "Reserved");

        // Two Admin candidates with different logins must not share the window.
        let _admin_reservation = if is_admin {
            let reservation = self.admission.try_reserve(AdmissionKey::AdminGroup);
            if reservation.is_none() {
                warn!(login = %record.login, "Rejected: another Admin creation in progress");
                return Err(UserError::AdminConflict);
            }
            reservation
        } else {
            None
        };

        tokio::time::sleep(self.creation_delay).await;

        if self.store.exists_user_with_login(&record.login).await? {
            warn!(login = %record.login, "Rejected: login already stored");
            return Err(UserError::LoginTaken(record.login));
        }

        if is_admin && self.store.exists_admin_group_user().await? {
            warn!(login = %record.login, "Rejected: an Admin user already exists");
            return Err(UserError::AdminConflict);
        }

        let user = self.store.insert_user(&record).await?;

        info!(
            user_id = user.id,
            login = %user.login,
            group = %record.group,
            "User created"
        );
        Ok(user)
    }

    async fn get_user(
        &self,
        filter: &UserFilter,
        includes: Includes,
        tracking: Tracking,
    ) -> Result<Option<User>, UserError> {
        info!("Getting a user from the database");

        Ok(self.store.find_user(filter, includes, tracking).await?)
    }

    async fn list_users(
        &self,
        filter: Option<&UserFilter>,
        skip: u64,
        take: u64,
        includes: Includes,
    ) -> Result<Vec<User>, UserError> {
        info!(skip, take, "Getting the user list from the database");

        check_page(skip, take)?;

        Ok(self.store.query_users(filter, skip, take, includes).await?)
    }

    async fn deactivate_user(&self, id: i32) -> Result<(), UserError> {
        info!(user_id = id, "Blocking a user");

        let mut state = self
            .store
            .find_user_state(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        if state.code == StatusCode::Blocked {
            debug!(user_id = id, "User already blocked");
        }

        state.code = StatusCode::Blocked;
        self.store.update_user_state(&state).await?;

        Ok(())
    }
}
