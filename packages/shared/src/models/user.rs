use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_RATING: i32 = 1000;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            rating: DEFAULT_RATING,
            created_at: Utc::now(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            rating: self.rating,
        }
    }
}

/// Public projection of a [`User`]; never carries the password hash.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub rating: i32,
}
