pub mod blacklist;
pub mod device;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod refresh;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

// Re-export the pieces handlers and app setup reach for.
pub use extractors::{AuthenticatedUser, BearerToken};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use service::AuthService;
pub use token::{Claims, TokenCodec, TokenError};

/// Payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(
        length(min = 8),
        must_match(other = "password_confirmation", message = "passwords do not match")
    )]
    pub password: String,
    pub password_confirmation: String,
}

/// Payload for exchanging a refresh token for a new token pair.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Optional logout body. Presenting a refresh token revokes that one session;
/// omitting it (or the whole body) revokes every session the user has.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Payload for changing the authenticated user's password.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(
        length(min = 8),
        must_match(other = "password_confirmation", message = "passwords do not match")
    )]
    pub password: String,
    pub password_confirmation: String,
}

/// Response after successful registration or login: a token pair plus the
/// authenticated user.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Response for a successful refresh: only the new token pair.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response for logout endpoints: how many refresh tokens were revoked.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedCountResponse {
    pub revoked_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let short_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "123".to_string(),
        };
        assert!(short_password_login.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            password_confirmation: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let mismatched_confirmation = RegisterRequest {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            password_confirmation: "different456".to_string(),
        };
        assert!(mismatched_confirmation.validate().is_err());

        let empty_name = RegisterRequest {
            name: "".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            password_confirmation: "password123".to_string(),
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_change_password_request_validation() {
        let valid = ChangePasswordRequest {
            current_password: "old-password".to_string(),
            password: "new-password-123".to_string(),
            password_confirmation: "new-password-123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let mismatch = ChangePasswordRequest {
            current_password: "old-password".to_string(),
            password: "new-password-123".to_string(),
            password_confirmation: "something-else".to_string(),
        };
        assert!(mismatch.validate().is_err());

        let short_new_password = ChangePasswordRequest {
            current_password: "old-password".to_string(),
            password: "short".to_string(),
            password_confirmation: "short".to_string(),
        };
        assert!(short_new_password.validate().is_err());
    }
}
