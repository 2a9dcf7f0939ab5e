use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::chat::ChatMessage;
use crate::models::game_move::GameMove;
use crate::models::room::{Coord, EndReason, Outcome, Room, RoomStatus, Symbol};
use crate::models::user::UserProfile;

/// Intents a client sends over the websocket, tagged by `action`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientIntent {
    CreateRoom,
    JoinRoom {
        room_code: String,
    },
    SyncRoom {
        room_code: String,
    },
    ToggleReady {
        room_code: String,
        ready: bool,
    },
    Start {
        room_code: String,
    },
    Leave {
        room_code: String,
    },
    FindMatch,
    CancelMatchmaking,
    SubmitMove {
        room_code: String,
        x: i64,
        y: i64,
    },
    FetchMoves {
        room_code: String,
    },
    SendChat {
        room_code: String,
        text: String,
    },
    FetchChatHistory {
        room_code: String,
        #[serde(default)]
        limit: Option<usize>,
    },
    Ping,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotView {
    pub user_id: String,
    pub username: String,
    pub rating: i32,
    pub symbol: Symbol,
    pub is_ready: bool,
}

/// What clients see of a room: the stored room plus player names and ratings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomView {
    pub code: String,
    pub host_id: String,
    pub status: RoomStatus,
    pub board_size: usize,
    pub win_length: usize,
    pub turn: Symbol,
    pub winner: Option<Outcome>,
    pub players: Vec<SlotView>,
    pub turn_started_at: Option<DateTime<Utc>>,
    pub turn_seconds: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomView {
    /// Players missing from `profiles` are shown with their id as name and rating 0.
    pub fn from_room(
        room: &Room,
        profiles: &HashMap<String, UserProfile>,
        turn_seconds: u64,
    ) -> Self {
        let players = room
            .players
            .iter()
            .map(|slot| {
                let profile = profiles.get(&slot.user_id);
                SlotView {
                    user_id: slot.user_id.clone(),
                    username: profile
                        .map(|p| p.username.clone())
                        .unwrap_or_else(|| slot.user_id.clone()),
                    rating: profile.map(|p| p.rating).unwrap_or_default(),
                    symbol: slot.symbol,
                    is_ready: slot.is_ready,
                }
            })
            .collect();

        RoomView {
            code: room.code.clone(),
            host_id: room.host_id.clone(),
            status: room.status,
            board_size: room.board_size,
            win_length: room.win_length,
            turn: room.turn,
            winner: room.winner,
            players,
            turn_started_at: room.turn_started_at,
            turn_seconds,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingChange {
    pub user_id: String,
    pub delta: i32,
    pub rating: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingDeltas {
    pub x: RatingChange,
    pub o: RatingChange,
}

/// Events pushed to clients, tagged by `event`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    RoomCreated {
        room_code: String,
        room: RoomView,
    },
    RoomJoined {
        room_code: String,
        room: RoomView,
        self_id: String,
    },
    RoomUpdated {
        room: RoomView,
    },
    RoomClosed {
        room_code: String,
        reason: String,
    },
    MatchStarted {
        room: RoomView,
    },
    MoveAccepted {
        room: RoomView,
        last_move: GameMove,
    },
    MatchEnded {
        room: RoomView,
        outcome: Outcome,
        winning_line: Option<Vec<Coord>>,
        last_move: Option<GameMove>,
        reason: EndReason,
        rating_deltas: Option<RatingDeltas>,
    },
    MatchError {
        message: String,
    },
    MatchmakingWaiting,
    MatchmakingMatched {
        room_code: String,
    },
    MatchmakingCanceled,
    MatchmakingError {
        message: String,
    },
    MoveLog {
        room_code: String,
        moves: Vec<GameMove>,
    },
    ChatMessage {
        message: ChatMessage,
    },
    ChatHistory {
        room_code: String,
        messages: Vec<ChatMessage>,
    },
    Pong,
}

impl ServerEvent {
    pub fn match_error(message: impl Into<String>) -> Self {
        ServerEvent::MatchError {
            message: message.into(),
        }
    }

    pub fn matchmaking_error(message: impl Into<String>) -> Self {
        ServerEvent::MatchmakingError {
            message: message.into(),
        }
    }
}
