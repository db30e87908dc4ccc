// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A learner account ('users' table).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,

    /// Argon2 PHC string, never serialized.
    #[serde(skip)]
    pub password: String,

    pub role: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// The authenticated learner with a count of their module activity.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    pub modules_started: i64,
    pub modules_completed: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters."))]
    pub username: String,
    #[validate(length(min = 4, max = 128, message = "Password must be 4 to 128 characters."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
