use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::room::{EndReason, Outcome, Symbol};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchPlayer {
    pub user_id: String,
    pub symbol: Symbol,
}

/// A finished game. Written once when the game ends and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameMatch {
    pub id: String,
    pub room_code: String,
    pub players: Vec<MatchPlayer>,
    /// Flattened ids so DynamoDB can filter on membership.
    pub player_ids: Vec<String>,
    pub winner: Outcome,
    pub reason: EndReason,
    pub ended_at: DateTime<Utc>,
}

impl GameMatch {
    pub fn new(
        room_code: &str,
        players: Vec<MatchPlayer>,
        winner: Outcome,
        reason: EndReason,
    ) -> Self {
        let player_ids = players.iter().map(|p| p.user_id.clone()).collect();
        GameMatch {
            id: Uuid::new_v4().to_string(),
            room_code: room_code.to_string(),
            players,
            player_ids,
            winner,
            reason,
            ended_at: Utc::now(),
        }
    }

    pub fn involves(&self, user_id: &str) -> bool {
        self.player_ids.iter().any(|id| id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_match_flattens_player_ids() {
        let game_match = GameMatch::new(
            "123456",
            vec![
                MatchPlayer {
                    user_id: "u1".to_string(),
                    symbol: Symbol::X,
                },
                MatchPlayer {
                    user_id: "u2".to_string(),
                    symbol: Symbol::O,
                },
            ],
            Outcome::X,
            EndReason::Normal,
        );

        assert_eq!(game_match.player_ids, vec!["u1", "u2"]);
        assert!(game_match.involves("u2"));
        assert!(!game_match.involves("u3"));
    }
}
