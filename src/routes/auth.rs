use crate::{
    auth::{
        device::device_label, AuthResponse, AuthService, AuthenticatedUser, BearerToken,
        ChangePasswordRequest, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
        RevokedCountResponse, TokenPairResponse,
    },
    error::AppError,
};
use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Creates the account and signs it straight in, returning an access/refresh
/// token pair for the registering device.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let (access_token, refresh_token, user) = auth
        .register(&payload, request_device(&req), &request_origin(&req))
        .await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token,
        refresh_token,
        user,
    }))
}

/// Login user
///
/// Authenticates with email and password; bad credentials surface as a 422 on
/// the `email` field, identical for unknown email and wrong password.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let (access_token, refresh_token, user) = auth
        .login(&payload, request_device(&req), &request_origin(&req))
        .await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token,
        refresh_token,
        user,
    }))
}

/// Exchange a refresh token for a new token pair
///
/// With rotation enabled (the default) the presented refresh token is dead
/// after this call, success or not; invalid or already-rotated tokens get 401.
#[post("/refresh")]
pub async fn refresh(
    auth: web::Data<AuthService>,
    payload: web::Json<RefreshRequest>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let (access_token, refresh_token) = auth
        .refresh(
            &payload.refresh_token,
            request_device(&req),
            &request_origin(&req),
        )
        .await?;

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        access_token,
        refresh_token,
    }))
}

/// Log out the current session
///
/// Blacklists the presented access token immediately. A `refresh_token` in
/// the body revokes just that session; an empty body revokes every session
/// the user has. The body is parsed by hand: the everywhere branch is
/// destructive, so a garbled payload must fail with a 400 rather than fall
/// through to it.
#[post("/logout")]
pub async fn logout(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
    bearer: BearerToken,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let payload: LogoutRequest = if body.is_empty() {
        LogoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid logout payload: {}", e)))?
    };
    let refresh_plaintext = payload.refresh_token.as_deref();

    let revoked_count = auth
        .logout(user.id, &bearer.token, bearer.expires_at, refresh_plaintext)
        .await?;

    Ok(HttpResponse::Ok().json(RevokedCountResponse { revoked_count }))
}

/// Log out everywhere
///
/// Revokes every refresh token for the user. Access tokens held by other
/// devices stay valid until their natural short expiry.
#[post("/logout/all")]
pub async fn logout_all(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let revoked_count = auth.logout_all(user.id).await?;
    Ok(HttpResponse::Ok().json(RevokedCountResponse { revoked_count }))
}

/// Current user
#[get("/user")]
pub async fn current_user(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = auth.current_user(user.id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Change the authenticated user's password
///
/// A wrong `current_password` is a field-level 422, not a 401: the caller is
/// already authenticated. Success revokes all refresh tokens.
#[post("/change-password")]
pub async fn change_password(
    auth: web::Data<AuthService>,
    user: AuthenticatedUser,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    auth.change_password(user.id, &payload.current_password, &payload.password)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Password updated" })))
}

fn request_device(req: &HttpRequest) -> &'static str {
    device_label(
        req.headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
    )
}

fn request_origin(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}
