use crate::auth::blacklist::AccessTokenBlacklist;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh::RefreshTokenStore;
use crate::auth::token::{Claims, TokenCodec};
use crate::auth::{LoginRequest, RegisterRequest};
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::models::user::Credentials;
use crate::models::User;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use sqlx::PgPool;

/// Message used for every credential failure on login, regardless of whether
/// the email exists. Attached to the `email` field as a 422, matching the
/// shape of the other validation failures on that endpoint.
const BAD_CREDENTIALS: &str = "These credentials do not match our records";

/// Orchestrates the token lifecycle: issues access/refresh pairs, validates
/// and rotates refresh tokens, and coordinates revocation across the refresh
/// store and the access-token blacklist.
pub struct AuthService {
    pool: PgPool,
    codec: TokenCodec,
    refresh_tokens: RefreshTokenStore,
    blacklist: AccessTokenBlacklist,
    rotate_on_refresh: bool,
}

impl AuthService {
    pub fn new(pool: PgPool, config: &AuthConfig) -> Self {
        Self {
            codec: TokenCodec::new(config),
            refresh_tokens: RefreshTokenStore::new(pool.clone(), config.refresh_ttl_minutes),
            blacklist: AccessTokenBlacklist::new(pool.clone()),
            rotate_on_refresh: config.rotate_on_refresh,
            pool,
        }
    }

    /// Creates the account and signs it in: one access token, one refresh
    /// record for the registering device.
    pub async fn register(
        &self,
        payload: &RegisterRequest,
        device_label: &str,
        origin_address: &str,
    ) -> Result<(String, String, User), AppError> {
        let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE email = $1")
            .bind(&payload.email)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AppError::field_validation("email", "already registered"));
        }

        let password_hash = hash_password(&payload.password)?;

        // The existence check above races with concurrent registers; the
        // unique index on email is the arbiter, so a violation here is the
        // same duplicate-email case, not a server fault.
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING id, name, email, created_at",
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::field_validation("email", "already registered")
            }
            _ => AppError::from(e),
        })?;

        info!("registered user {} ({})", user.id, device_label);

        let access_token = self.codec.issue(user.id, &user.email)?;
        let (refresh_plaintext, _) = self
            .refresh_tokens
            .issue(user.id, device_label, origin_address)
            .await?;

        Ok((access_token, refresh_plaintext, user))
    }

    /// Verifies the password and issues a fresh token pair for this device.
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(
        &self,
        payload: &LoginRequest,
        device_label: &str,
        origin_address: &str,
    ) -> Result<(String, String, User), AppError> {
        let credentials =
            sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE email = $1")
                .bind(&payload.email)
                .fetch_optional(&self.pool)
                .await?;

        let credentials = credentials
            .ok_or_else(|| AppError::field_validation("email", BAD_CREDENTIALS))?;

        if !verify_password(&payload.password, &credentials.password_hash)? {
            debug!("failed login attempt for user {}", credentials.id);
            return Err(AppError::field_validation("email", BAD_CREDENTIALS));
        }

        let user = self.find_user(credentials.id).await?;
        let access_token = self.codec.issue(user.id, &user.email)?;
        let (refresh_plaintext, _) = self
            .refresh_tokens
            .issue(user.id, device_label, origin_address)
            .await?;

        info!("user {} logged in ({})", user.id, device_label);
        Ok((access_token, refresh_plaintext, user))
    }

    /// Exchanges a valid refresh token for a new access token.
    ///
    /// With rotation enabled (the default) the presented record is revoked
    /// first and a replacement issued after; the conditional revoke is the
    /// critical section that makes two concurrent refreshes of the same
    /// plaintext yield exactly one success. If issuing the replacement fails,
    /// the old token stays revoked and the request surfaces a server error:
    /// never two live tokens, and never a silently-dead session.
    pub async fn refresh(
        &self,
        refresh_plaintext: &str,
        device_label: &str,
        origin_address: &str,
    ) -> Result<(String, String), AppError> {
        let record = self
            .refresh_tokens
            .validate(refresh_plaintext)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

        let user = self.find_user(record.user_id).await.map_err(|_| {
            warn!("refresh token {} references missing user {}", record.id, record.user_id);
            AppError::Unauthorized("Invalid refresh token".into())
        })?;

        if !self.rotate_on_refresh {
            self.refresh_tokens.touch(record.id).await?;
            let access_token = self.codec.issue(user.id, &user.email)?;
            return Ok((access_token, refresh_plaintext.to_string()));
        }

        // Revoke-then-issue. Losing the conditional update means a concurrent
        // call already rotated this token.
        if !self.refresh_tokens.revoke(record.id).await? {
            warn!("refresh token {} lost rotation race", record.id);
            return Err(AppError::Unauthorized("Invalid refresh token".into()));
        }

        let (new_plaintext, _) = self
            .refresh_tokens
            .issue(user.id, device_label, origin_address)
            .await
            .map_err(|e| {
                AppError::InternalServerError(format!(
                    "failed to issue replacement refresh token after revocation: {}",
                    e
                ))
            })?;

        let access_token = self.codec.issue(user.id, &user.email)?;
        Ok((access_token, new_plaintext))
    }

    /// Blacklists the presented access token for its remaining natural
    /// lifetime, then revokes refresh state: the named record if one was
    /// presented, otherwise every record the user has (logout everywhere).
    /// Returns the number of refresh tokens revoked.
    pub async fn logout(
        &self,
        user_id: i32,
        access_token: &str,
        access_token_expires_at: DateTime<Utc>,
        refresh_plaintext: Option<&str>,
    ) -> Result<u64, AppError> {
        self.blacklist
            .add(access_token, user_id, access_token_expires_at)
            .await?;

        let revoked = match refresh_plaintext {
            Some(plaintext) => {
                u64::from(self.refresh_tokens.revoke_by_secret(user_id, plaintext).await?)
            }
            None => self.refresh_tokens.revoke_all(user_id).await?,
        };

        info!("user {} logged out, {} refresh token(s) revoked", user_id, revoked);
        Ok(revoked)
    }

    /// Revokes every refresh token the user has and returns the exact count.
    /// Access tokens on other devices stay valid until their short expiry.
    pub async fn logout_all(&self, user_id: i32) -> Result<u64, AppError> {
        let revoked = self.refresh_tokens.revoke_all(user_id).await?;
        info!("user {} logged out everywhere, {} refresh token(s) revoked", user_id, revoked);
        Ok(revoked)
    }

    /// Verifies the current password and replaces the stored hash. A mismatch
    /// fails closed with a field-level error and leaves the hash untouched.
    /// On success all refresh tokens are revoked, so other devices must
    /// re-authenticate once their access tokens run out.
    pub async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let credentials =
            sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

        if !verify_password(current_password, &credentials.password_hash)? {
            return Err(AppError::field_validation(
                "current_password",
                "does not match your current password",
            ));
        }

        let new_hash = hash_password(new_password)?;
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&new_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let revoked = self.refresh_tokens.revoke_all(user_id).await?;
        info!(
            "user {} changed password, {} refresh token(s) revoked",
            user_id, revoked
        );
        Ok(())
    }

    /// Validates a bearer token for the auth gate: signature and expiry via
    /// the codec, blacklist membership, and that the subject still exists.
    /// Every failure collapses to the same client-facing 401; the specific
    /// reason is only logged.
    pub async fn authenticate(&self, token: &str) -> Result<(User, Claims), AppError> {
        let claims = self.codec.verify(token).map_err(|kind| {
            debug!("rejected access token: {}", kind);
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        if self.blacklist.contains(token).await? {
            debug!("rejected blacklisted access token for user {}", claims.sub);
            return Err(AppError::Unauthorized("Invalid or expired token".into()));
        }

        let user = self.find_user(claims.sub).await.map_err(|_| {
            debug!("rejected access token for missing user {}", claims.sub);
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok((user, claims))
    }

    pub async fn current_user(&self, user_id: i32) -> Result<User, AppError> {
        self.find_user(user_id).await
    }

    async fn find_user(&self, user_id: i32) -> Result<User, AppError> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, name, email, created_at FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        user.ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}
