use jsonwebtoken::Algorithm;
use std::env;

/// Top-level application configuration, read once at startup.
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub auth: AuthConfig,
}

/// Everything the token subsystem needs. Passed explicitly into constructors
/// so no component reads the environment at call time.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric signing secret for access tokens. Rotating it invalidates
    /// every outstanding access token, which is acceptable: they are short-lived.
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
    /// When true (the default), every successful refresh revokes the presented
    /// refresh token and issues a replacement.
    pub rotate_on_refresh: bool,
    /// Revoked refresh tokens older than this are eligible for pruning.
    pub prune_after_days: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            auth: AuthConfig::from_env(),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let algorithm = match env::var("JWT_ALGORITHM")
            .unwrap_or_else(|_| "HS256".to_string())
            .as_str()
        {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => panic!("JWT_ALGORITHM must be one of HS256/HS384/HS512, got {}", other),
        };
        Self {
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_algorithm: algorithm,
            access_ttl_minutes: env_i64("ACCESS_TOKEN_TTL_MINUTES", 15),
            refresh_ttl_minutes: env_i64("REFRESH_TOKEN_TTL_MINUTES", 43200),
            rotate_on_refresh: env::var("ROTATE_REFRESH_TOKENS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            prune_after_days: env_i64("PRUNE_AFTER_DAYS", 30),
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .map(|v| v.parse().unwrap_or_else(|_| panic!("{} must be a number", key)))
        .unwrap_or(default)
}
