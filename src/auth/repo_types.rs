use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub avatar: String, // public path, e.g. /uploads/<file>
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields supplied at registration; id and timestamps are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub avatar: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
