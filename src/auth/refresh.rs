use crate::error::AppError;
use crate::models::RefreshToken;
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// Entropy of a refresh-token secret: 32 bytes, rendered as 64 hex chars.
const SECRET_BYTES: usize = 32;

const REFRESH_TOKEN_COLUMNS: &str = "id, user_id, token_hash, device_label, origin_address, \
     expires_at, revoked_at, last_used_at, created_at";

/// Durable, rotate-able session records, one row per device/login.
///
/// Only the SHA-256 digest of a secret ever touches the database; lookups go
/// by digest, so plaintext values are never compared or stored.
#[derive(Clone)]
pub struct RefreshTokenStore {
    pool: PgPool,
    refresh_ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(pool: PgPool, refresh_ttl_minutes: i64) -> Self {
        Self {
            pool,
            refresh_ttl: Duration::minutes(refresh_ttl_minutes),
        }
    }

    /// Generates a fresh secret, persists its digest, and returns the
    /// plaintext alongside the stored record. The plaintext is retrievable
    /// exactly once: here.
    pub async fn issue(
        &self,
        user_id: i32,
        device_label: &str,
        origin_address: &str,
    ) -> Result<(String, RefreshToken), AppError> {
        let plaintext = generate_secret();
        let expires_at = Utc::now() + self.refresh_ttl;

        let sql = format!(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, device_label, origin_address, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            REFRESH_TOKEN_COLUMNS
        );
        let record = sqlx::query_as::<_, RefreshToken>(&sql)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(digest(&plaintext))
        .bind(device_label)
        .bind(origin_address)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok((plaintext, record))
    }

    /// Looks up the record whose digest matches the presented secret, if that
    /// record is currently valid (not revoked, not expired).
    pub async fn validate(&self, plaintext: &str) -> Result<Option<RefreshToken>, AppError> {
        let sql = format!(
            "SELECT {} FROM refresh_tokens \
             WHERE token_hash = $1 AND revoked_at IS NULL AND expires_at > now()",
            REFRESH_TOKEN_COLUMNS
        );
        let record = sqlx::query_as::<_, RefreshToken>(&sql)
        .bind(digest(plaintext))
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Revokes a record, but only if it was still valid at the moment of the
    /// update. Returns whether this call was the one that revoked it: under
    /// two concurrent rotations of the same token, exactly one caller sees
    /// `true`.
    pub async fn revoke(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = now() \
             WHERE id = $1 AND revoked_at IS NULL AND expires_at > now()",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Revokes the user's record matching the presented secret, for
    /// single-session logout. Idempotent; returns whether a row was revoked.
    pub async fn revoke_by_secret(&self, user_id: i32, plaintext: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = now() \
             WHERE user_id = $1 AND token_hash = $2 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .bind(digest(plaintext))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Revokes every currently-unrevoked record for the user ("logout
    /// everywhere"). Returns the number of rows newly revoked.
    pub async fn revoke_all(&self, user_id: i32) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = now() \
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Bumps `last_used_at` without rotating. Only used when rotation is
    /// disabled by configuration.
    pub async fn touch(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE refresh_tokens SET last_used_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Deletes rows already outside the validity window: expired rows, and
    /// revoked rows older than the cutoff. Safe to run alongside live traffic.
    pub async fn prune(&self, revoked_older_than_days: i64) -> Result<u64, AppError> {
        let revoked_cutoff = Utc::now() - Duration::days(revoked_older_than_days);

        let result = sqlx::query(
            "DELETE FROM refresh_tokens \
             WHERE expires_at <= now() \
                OR (revoked_at IS NOT NULL AND revoked_at < $1)",
        )
        .bind(revoked_cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// 256 bits from the OS RNG, hex-encoded to a fixed-length printable string.
fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex SHA-256 of the plaintext secret. One-way; this is all we ever store.
pub(crate) fn digest(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_fixed_length_hex() {
        let secret = generate_secret();
        assert_eq!(secret.len(), SECRET_BYTES * 2);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_secrets_are_unique() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn test_digest_is_deterministic_and_one_way() {
        let secret = generate_secret();
        assert_eq!(digest(&secret), digest(&secret));
        assert_ne!(digest(&secret), secret);
        assert_eq!(digest(&secret).len(), 64);
    }
}
