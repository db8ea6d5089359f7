use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A revoked-but-unexpired access token.
///
/// An entry only needs to outlive the token's own `expires_at`: past that
/// point the codec rejects the token anyway, so the blacklist is a bridge for
/// the remaining natural lifetime, not a permanent store. Rows are created on
/// logout, never mutated, and deleted by pruning.
#[derive(Debug, Clone, FromRow)]
pub struct BlacklistedToken {
    pub id: Uuid,
    pub user_id: i32,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
