use crate::models::user_log::UserLogEntry;
use crate::utils::errors::AppError;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserLogRepository {
    pool: PgPool,
}

impl UserLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: &UserLogEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_logs (id, user_id, action, ip_address, outcome, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(&entry.ip_address)
        .bind(entry.outcome)
        .bind(&entry.details)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
