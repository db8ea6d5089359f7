use crate::error::AppError;
use bcrypt::{hash, verify};

pub fn hash_password(password: &str) -> Result<String, AppError> {
    // bcrypt cost 12; verification is constant-time inside the crate.
    Ok(hash(password, 12)?)
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    Ok(verify(password, hashed_password)?)
}
