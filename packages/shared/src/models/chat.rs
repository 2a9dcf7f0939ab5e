use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_CHAT_LEN: usize = 500;
pub const DEFAULT_CHAT_HISTORY: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub room_code: String,
    pub user_id: String,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(room_code: &str, user_id: &str, username: &str, text: &str) -> Self {
        ChatMessage {
            id: Uuid::new_v4().to_string(),
            room_code: room_code.to_string(),
            user_id: user_id.to_string(),
            username: username.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }
}
