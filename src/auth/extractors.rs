use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use chrono::{DateTime, Utc};
use std::future::{ready, Ready};

use crate::error::AppError;

/// The resolved identity of the current request, inserted into request
/// extensions by `AuthMiddleware` after the token passed every check.
///
/// If the value is missing (middleware not applied, or applied after this
/// extractor somehow ran), the extractor fails with 401 rather than guessing.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(user) => ready(Ok(user)),
            None => {
                let err = AppError::Unauthorized(
                    "No authenticated user bound to request. Ensure AuthMiddleware is active."
                        .to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

/// The raw bearer token the request authenticated with, plus its natural
/// expiry. Logout needs both: the token string goes on the blacklist with its
/// own embedded expiry as the entry's lifetime.
#[derive(Debug, Clone)]
pub struct BearerToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl FromRequest for BearerToken {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<BearerToken>().cloned() {
            Some(token) => ready(Ok(token)),
            None => {
                let err = AppError::Unauthorized(
                    "No bearer token bound to request. Ensure AuthMiddleware is active."
                        .to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
