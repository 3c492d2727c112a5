use crate::models::{
    GroupCode, Includes, Tracking, User, UserFilter, UserRecord, UserState,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub mod migrator;
pub mod repositories;

use repositories::user::UserRepository;

/// Failures surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User with login '{0}' already exists")]
    DuplicateLogin(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Invalid stored value: {0}")]
    Decode(String),
}

/// Persistence operations the account services depend on.
///
/// None of these calls coordinate with one another; in particular nothing
/// here makes a check-then-insert on login atomic.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a user with its group and state as one unit.
    async fn insert_user(&self, record: &UserRecord) -> Result<User, StoreError>;

    async fn exists_user_with_login(&self, login: &str) -> Result<bool, StoreError>;

    async fn exists_admin_group_user(&self) -> Result<bool, StoreError>;

    async fn find_user_state(&self, user_id: i32) -> Result<Option<UserState>, StoreError>;

    async fn update_user_state(&self, state: &UserState) -> Result<(), StoreError>;

    async fn find_user(
        &self,
        filter: &UserFilter,
        includes: Includes,
        tracking: Tracking,
    ) -> Result<Option<User>, StoreError>;

    async fn query_users(
        &self,
        filter: Option<&UserFilter>,
        skip: u64,
        take: u64,
        includes: Includes,
    ) -> Result<Vec<User>, StoreError>;
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file: {path_str}"))?;
            }
        }

        // Every pooled connection to `:memory:` would get its own empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections.min(max_connections))
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        migrator::Migrator::up(&conn, None)
            .await
            .context("Failed to apply migrations")?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }
}

#[async_trait]
impl UserStore for Store {
    async fn insert_user(&self, record: &UserRecord) -> Result<User, StoreError> {
        self.user_repo().insert(record).await
    }

    async fn exists_user_with_login(&self, login: &str) -> Result<bool, StoreError> {
        self.user_repo().exists_with_login(login).await
    }

    async fn exists_admin_group_user(&self) -> Result<bool, StoreError> {
        self.user_repo().exists_in_group(GroupCode::Admin).await
    }

    async fn find_user_state(&self, user_id: i32) -> Result<Option<UserState>, StoreError> {
        self.user_repo().find_state(user_id).await
    }

    async fn update_user_state(&self, state: &UserState) -> Result<(), StoreError> {
        self.user_repo().update_state(state).await
    }

    async fn find_user(
        &self,
        filter: &UserFilter,
        includes: Includes,
        tracking: Tracking,
    ) -> Result<Option<User>, StoreError> {
        debug!(?filter, ?includes, ?tracking, "Looking up user");
        let mut users = self.user_repo().query(Some(filter), 0, 1, includes).await?;
        Ok(users.pop())
    }

    async fn query_users(
        &self,
        filter: Option<&UserFilter>,
        skip: u64,
        take: u64,
        includes: Includes,
    ) -> Result<Vec<User>, StoreError> {
        self.user_repo().query(filter, skip, take, includes).await
    }
}
