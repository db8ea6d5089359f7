use crate::config::AuthConfig;
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: i32,
    /// Email of the user at issuance time.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Always `"access"`. Guards against a refresh-shaped token (or any other
    /// signed blob) being presented as an access token.
    #[serde(rename = "type")]
    pub token_type: String,
}

impl Claims {
    /// The token's natural expiry as an instant. Used as the blacklist entry's
    /// expiry when the token is revoked on logout.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Why verification of an access token failed. Callers treat every kind
/// identically (reject as unauthenticated); the kinds exist for logging.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    BadSignature,
    NotYetValid,
    Malformed,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::Expired => write!(f, "token expired"),
            TokenError::BadSignature => write!(f, "bad signature"),
            TokenError::NotYetValid => write!(f, "token not yet valid"),
            TokenError::Malformed => write!(f, "malformed token"),
        }
    }
}

/// Produces and verifies access tokens without any server-side state.
///
/// The signing secret and algorithm come from `AuthConfig` at construction;
/// nothing here reads the environment. Changing the secret invalidates all
/// outstanding access tokens at once, which is fine: they live for minutes.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    access_ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            header: Header::new(config.jwt_algorithm),
            validation: Validation::new(config.jwt_algorithm),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
        }
    }

    /// Builds and signs an access token for the given user.
    pub fn issue(&self, user_id: i32, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            token_type: "access".to_string(),
        };

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Checks the signature and time bounds of a token and decodes its claims.
    ///
    /// Returns a typed failure rather than an HTTP-level error; the caller
    /// decides how much of the reason to surface (for clients: nothing).
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                _ => TokenError::Malformed,
            }
        })?;

        if data.claims.token_type != "access" {
            return Err(TokenError::Malformed);
        }
        Ok(data.claims)
    }
}
