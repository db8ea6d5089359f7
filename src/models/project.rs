use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A project owned by a single user. Tasks may optionally belong to a project.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating or updating a project.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ProjectInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,
}
