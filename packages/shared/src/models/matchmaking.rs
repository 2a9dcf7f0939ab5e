use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A seeker waiting in the matchmaking queue. Lives only in memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub user_id: String,
    pub connection_id: String,
    pub enqueued_at: DateTime<Utc>,
}

impl Ticket {
    pub fn new(user_id: &str, connection_id: &str) -> Self {
        Ticket {
            user_id: user_id.to_string(),
            connection_id: connection_id.to_string(),
            enqueued_at: Utc::now(),
        }
    }
}
