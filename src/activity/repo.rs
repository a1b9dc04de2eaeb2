use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{ActivityTotals, LogEntry, NewLogEntry};

impl LogEntry {
    pub async fn create(db: &PgPool, entry: &NewLogEntry) -> Result<LogEntry, sqlx::Error> {
        sqlx::query_as::<_, LogEntry>(
            r#"
            INSERT INTO log_entries (id, user_id, date, activity, amount, carbon_emission)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, date, activity, amount, carbon_emission, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.date)
        .bind(&entry.activity)
        .bind(entry.amount)
        .bind(entry.carbon_emission)
        .fetch_one(db)
        .await
    }

    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<LogEntry>, sqlx::Error> {
        sqlx::query_as::<_, LogEntry>(
            r#"
            SELECT id, user_id, date, activity, amount, carbon_emission, created_at, updated_at
            FROM log_entries
            WHERE user_id = $1
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn totals_by_activity(db: &PgPool) -> Result<Vec<ActivityTotals>, sqlx::Error> {
        sqlx::query_as::<_, ActivityTotals>(
            r#"
            SELECT activity,
                   COALESCE(SUM(amount), 0)::DOUBLE PRECISION AS total_amount,
                   COALESCE(SUM(carbon_emission), 0)::DOUBLE PRECISION AS total_carbon_emission
            FROM log_entries
            GROUP BY activity
            "#,
        )
        .fetch_all(db)
        .await
    }
}
