use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::room::{Coord, Symbol};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameMove {
    pub id: String,
    pub room_code: String,
    pub seq: u32,
    pub x: usize,
    pub y: usize,
    pub symbol: Symbol,
    pub user_id: String,
    pub match_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GameMove {
    /// Sequence numbers are assigned by the move repository on append.
    pub fn new(room_code: &str, x: usize, y: usize, symbol: Symbol, user_id: &str) -> Self {
        GameMove {
            id: Uuid::new_v4().to_string(),
            room_code: room_code.to_string(),
            seq: 0,
            x,
            y,
            symbol,
            user_id: user_id.to_string(),
            match_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn coord(&self) -> Coord {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}
