//! Maintenance command: deletes token rows already outside their validity
//! window. Expired refresh tokens, revoked refresh tokens older than the
//! configured cutoff, and expired blacklist entries. Idempotent and safe to
//! run alongside live traffic.

use log::info;
use sqlx::PgPool;

use taskhub::auth::blacklist::AccessTokenBlacklist;
use taskhub::auth::refresh::RefreshTokenStore;
use taskhub::config::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let refresh_tokens = RefreshTokenStore::new(pool.clone(), config.auth.refresh_ttl_minutes);
    let blacklist = AccessTokenBlacklist::new(pool);

    let pruned_refresh = refresh_tokens
        .prune(config.auth.prune_after_days)
        .await
        .expect("Failed to prune refresh tokens");
    let pruned_blacklist = blacklist
        .prune()
        .await
        .expect("Failed to prune blacklisted tokens");

    info!(
        "pruned {} refresh token(s) and {} blacklisted access token(s)",
        pruned_refresh, pruned_blacklist
    );
    println!(
        "pruned {} refresh token(s), {} blacklisted access token(s)",
        pruned_refresh, pruned_blacklist
    );

    Ok(())
}
