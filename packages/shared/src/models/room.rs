use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_PLAYERS: usize = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    pub fn other(self) -> Symbol {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Ready,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome {
    X,
    O,
    #[serde(rename = "draw")]
    Draw,
}

impl Outcome {
    pub fn win_for(symbol: Symbol) -> Outcome {
        match symbol {
            Symbol::X => Outcome::X,
            Symbol::O => Outcome::O,
        }
    }

    /// Score from X's point of view: 1 for a win, 0.5 for a draw, 0 for a loss.
    pub fn score_for_x(self) -> f64 {
        match self {
            Outcome::X => 1.0,
            Outcome::Draw => 0.5,
            Outcome::O => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Normal,
    Timeout,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSlot {
    pub user_id: String,
    pub symbol: Symbol,
    pub is_ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub code: String,
    pub host_id: String,
    pub status: RoomStatus,
    pub board_size: usize,
    pub win_length: usize,
    pub players: Vec<PlayerSlot>,
    pub turn: Symbol,
    pub winner: Option<Outcome>,
    pub turn_started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// A fresh room with the host seated as X.
    pub fn new(code: &str, host_id: &str, board_size: usize, win_length: usize) -> Self {
        let now = Utc::now();
        Room {
            code: code.to_string(),
            host_id: host_id.to_string(),
            status: RoomStatus::Waiting,
            board_size,
            win_length,
            players: vec![PlayerSlot {
                user_id: host_id.to_string(),
                symbol: Symbol::X,
                is_ready: false,
            }],
            turn: Symbol::X,
            winner: None,
            turn_started_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn player(&self, user_id: &str) -> Option<&PlayerSlot> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    pub fn player_mut(&mut self, user_id: &str) -> Option<&mut PlayerSlot> {
        self.players.iter_mut().find(|p| p.user_id == user_id)
    }

    pub fn player_with_symbol(&self, symbol: Symbol) -> Option<&PlayerSlot> {
        self.players.iter().find(|p| p.symbol == symbol)
    }

    pub fn is_host(&self, user_id: &str) -> bool {
        self.host_id == user_id
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// The symbol nobody holds yet, X first.
    pub fn free_symbol(&self) -> Option<Symbol> {
        [Symbol::X, Symbol::O]
            .into_iter()
            .find(|s| self.player_with_symbol(*s).is_none())
    }

    pub fn all_ready(&self) -> bool {
        self.players.len() == MAX_PLAYERS && self.players.iter().all(|p| p.is_ready)
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == RoomStatus::Playing && self.winner.is_none()
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        let size = self.board_size as i64;
        x >= 0 && y >= 0 && x < size && y < size
    }

    /// Puts the room into a fresh game with X to move and the clock running from `now`.
    pub fn begin_game(&mut self, now: DateTime<Utc>) {
        self.status = RoomStatus::Playing;
        self.winner = None;
        self.turn = Symbol::X;
        self.turn_started_at = Some(now);
        self.updated_at = now;
    }

    pub fn finish(&mut self, outcome: Outcome, now: DateTime<Utc>) {
        self.status = RoomStatus::Finished;
        self.winner = Some(outcome);
        self.turn_started_at = None;
        for player in &mut self.players {
            player.is_ready = false;
        }
        self.updated_at = now;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_room() -> Room {
        let mut room = Room::new("123456", "host", 15, 5);
        room.players.push(PlayerSlot {
            user_id: "guest".to_string(),
            symbol: Symbol::O,
            is_ready: false,
        });
        room
    }

    #[test]
    fn test_new_room_seats_host_as_x() {
        let room = Room::new("123456", "host", 15, 5);

        assert_eq!(room.status, RoomStatus::Waiting);
        assert_eq!(room.players.len(), 1);
        assert_eq!(room.players[0].symbol, Symbol::X);
        assert!(room.is_host("host"));
        assert!(room.turn_started_at.is_none());
        assert_eq!(room.free_symbol(), Some(Symbol::O));
    }

    #[test]
    fn test_full_room_has_no_free_symbol() {
        let room = two_player_room();

        assert!(room.is_full());
        assert_eq!(room.free_symbol(), None);
    }

    #[test]
    fn test_in_bounds() {
        let room = Room::new("1", "h", 15, 5);

        assert!(room.in_bounds(0, 0));
        assert!(room.in_bounds(14, 14));
        assert!(!room.in_bounds(15, 0));
        assert!(!room.in_bounds(-1, 3));
    }

    #[test]
    fn test_finish_clears_clock_and_ready_flags() {
        let mut room = two_player_room();
        for p in &mut room.players {
            p.is_ready = true;
        }
        room.begin_game(Utc::now());
        assert!(room.is_in_progress());

        room.finish(Outcome::O, Utc::now());

        assert_eq!(room.status, RoomStatus::Finished);
        assert_eq!(room.winner, Some(Outcome::O));
        assert!(room.turn_started_at.is_none());
        assert!(room.players.iter().all(|p| !p.is_ready));
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&RoomStatus::Playing).unwrap(), "\"playing\"");
        assert_eq!(serde_json::to_string(&Outcome::Draw).unwrap(), "\"draw\"");
        assert_eq!(serde_json::to_string(&Outcome::X).unwrap(), "\"X\"");
        assert_eq!(serde_json::to_string(&EndReason::Timeout).unwrap(), "\"timeout\"");
    }

    #[test]
    fn test_symbol_other() {
        assert_eq!(Symbol::X.other(), Symbol::O);
        assert_eq!(Symbol::O.other(), Symbol::X);
    }
}
