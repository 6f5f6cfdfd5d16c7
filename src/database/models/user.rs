use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new user row; `password` is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub roles: Vec<String>,
}

impl NewUser {
    pub fn with_default_role(username: String, email: Option<String>, password: String) -> Self {
        Self {
            username,
            email,
            password,
            roles: vec![ROLE_USER.to_string()],
        }
    }
}
