use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::activity::repo_types::{ActivityTotals, LogEntry, NewLogEntry};
use crate::auth::repo_types::{NewUser, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user with this email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Everything the handlers need from persistence. Rows are never updated or deleted.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn count_users(&self) -> Result<i64, StoreError>;
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn insert_entry(&self, entry: NewLogEntry) -> Result<LogEntry, StoreError>;
    /// Newest `date` first.
    async fn entries_for_user(&self, user_id: Uuid) -> Result<Vec<LogEntry>, StoreError>;
    async fn summarize_by_activity(&self) -> Result<Vec<ActivityTotals>, StoreError>;
}

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(User::count(&self.pool).await?)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        User::create(&self.pool, &user).await.map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            other => StoreError::Database(other),
        })
    }

    async fn insert_entry(&self, entry: NewLogEntry) -> Result<LogEntry, StoreError> {
        Ok(LogEntry::create(&self.pool, &entry).await?)
    }

    async fn entries_for_user(&self, user_id: Uuid) -> Result<Vec<LogEntry>, StoreError> {
        Ok(LogEntry::list_by_user(&self.pool, user_id).await?)
    }

    async fn summarize_by_activity(&self) -> Result<Vec<ActivityTotals>, StoreError> {
        Ok(LogEntry::totals_by_activity(&self.pool).await?)
    }
}
