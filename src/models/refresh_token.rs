use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted refresh-token record: one row per active session/device.
///
/// `token_hash` is the hex SHA-256 digest of the plaintext secret. The
/// plaintext itself is handed to the client exactly once at issuance and is
/// never stored, so a database compromise cannot yield usable tokens.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: i32,
    pub token_hash: String,
    pub device_label: String,
    pub origin_address: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// A token is valid iff it is neither revoked nor expired.
    pub fn is_valid(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_in: Duration, revoked: bool) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            id: Uuid::new_v4(),
            user_id: 1,
            token_hash: "a".repeat(64),
            device_label: "Chrome".to_string(),
            origin_address: "127.0.0.1".to_string(),
            expires_at: now + expires_in,
            revoked_at: revoked.then_some(now),
            last_used_at: None,
            created_at: now,
        }
    }

    #[test]
    fn test_validity_window() {
        assert!(token(Duration::days(30), false).is_valid());
        assert!(!token(Duration::days(30), true).is_valid());
        assert!(!token(Duration::seconds(-1), false).is_valid());
        assert!(!token(Duration::seconds(-1), true).is_valid());
    }
}
