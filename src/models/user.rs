use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user account as returned by the API. The password hash lives only in the
/// `users` table and in [`Credentials`]; it is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Row shape used by the login and change-password paths, where the stored
/// hash is needed for verification.
#[derive(Debug, FromRow)]
pub struct Credentials {
    pub id: i32,
    pub password_hash: String,
}
