use crate::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Deny-list of otherwise-still-valid access tokens.
///
/// Consulted on every authenticated request, so `contains` must stay a point
/// lookup: the `token` column carries a unique index.
#[derive(Clone)]
pub struct AccessTokenBlacklist {
    pool: PgPool,
}

impl AccessTokenBlacklist {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a revoked access token until its natural expiry. Inserting the
    /// same token twice is a no-op.
    pub async fn add(
        &self,
        token: &str,
        user_id: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO blacklisted_tokens (id, user_id, token, expires_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (token) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn contains(&self, token: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM blacklisted_tokens WHERE token = $1)",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Deletes entries whose underlying token the codec would reject anyway.
    /// Maintenance only; correctness never depends on pruning.
    pub async fn prune(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM blacklisted_tokens WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
