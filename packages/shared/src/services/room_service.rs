use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::models::events::{RatingChange, RatingDeltas, RoomView};
use crate::models::game_match::{GameMatch, MatchPlayer};
use crate::models::game_move::GameMove;
use crate::models::room::{Coord, EndReason, Outcome, PlayerSlot, Room, RoomStatus, Symbol};
use crate::models::user::UserProfile;
use crate::repositories::chat_repository::ChatRepository;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::match_repository::MatchRepository;
use crate::repositories::move_repository::MoveRepository;
use crate::repositories::room_repository::RoomRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::room_service_errors::RoomServiceError;
use crate::services::rating_service::RatingService;
use crate::services::room_code_service::RoomCodeService;
use crate::services::rules_service::{Board, RulesService};
use crate::services::turn_timer_service::{TurnExpired, TurnTimerService};

#[derive(Debug, Clone, Copy)]
pub struct GameSettings {
    pub board_size: usize,
    pub win_length: usize,
    pub turn_seconds: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            board_size: 15,
            win_length: 5,
            turn_seconds: 30,
        }
    }
}

/// The stores a room's lifecycle reads and writes.
#[derive(Clone)]
pub struct GameStores {
    pub rooms: Arc<dyn RoomRepository + Send + Sync>,
    pub moves: Arc<dyn MoveRepository + Send + Sync>,
    pub matches: Arc<dyn MatchRepository + Send + Sync>,
    pub users: Arc<dyn UserRepository + Send + Sync>,
    pub chat: Arc<dyn ChatRepository + Send + Sync>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyOutcome {
    pub room: RoomView,
    pub started: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeaveOutcome {
    /// The host left and the room no longer exists.
    Closed,
    /// A guest left; the room is back to waiting.
    Left(RoomView),
    /// The caller held no seat, nothing changed.
    NotSeated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchSummary {
    pub match_id: Option<String>,
    pub room: RoomView,
    pub outcome: Outcome,
    pub winning_line: Option<Vec<Coord>>,
    pub last_move: Option<GameMove>,
    pub reason: EndReason,
    pub rating_deltas: Option<RatingDeltas>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    Continued { room: RoomView, last_move: GameMove },
    Finished(MatchSummary),
}

/// Owns every room's lifecycle. All writes to one room run under that room's lock.
///
/// The lock map only holds weak handles, so an entry lives as long as some caller
/// is using it and is pruned on the next lookup.
pub struct RoomService {
    stores: GameStores,
    codes: RoomCodeService,
    rules: RulesService,
    ratings: RatingService,
    timers: Arc<TurnTimerService>,
    settings: GameSettings,
    locks: Mutex<HashMap<String, Weak<tokio::sync::Mutex<()>>>>,
}

impl RoomService {
    pub fn new(stores: GameStores, timers: Arc<TurnTimerService>, settings: GameSettings) -> Self {
        RoomService {
            codes: RoomCodeService::new(stores.rooms.clone()),
            stores,
            rules: RulesService::new(),
            ratings: RatingService::default(),
            timers,
            settings,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    fn room_lock(&self, code: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(lock) = locks.get(code).and_then(Weak::upgrade) {
            return lock;
        }
        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(tokio::sync::Mutex::new(()));
        locks.insert(code.to_string(), Arc::downgrade(&lock));
        lock
    }

    /// Number of room locks some caller still holds.
    pub fn active_locks(&self) -> usize {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, lock| lock.strong_count() > 0);
        locks.len()
    }

    /// Builds the client view, looking up names and ratings of the seated players.
    pub async fn room_view(&self, room: &Room) -> RoomView {
        let mut profiles: HashMap<String, UserProfile> = HashMap::new();
        for slot in &room.players {
            match self.stores.users.get_user_by_id(&slot.user_id).await {
                Ok(user) => {
                    profiles.insert(user.id.clone(), user.profile());
                }
                Err(e) => warn!("Failed to load profile {}: {}", slot.user_id, e),
            }
        }
        RoomView::from_room(room, &profiles, self.settings.turn_seconds)
    }

    pub async fn get_room(&self, code: &str) -> Result<Room, RoomServiceError> {
        Ok(self.stores.rooms.get_room(code).await?)
    }

    /// Returns the room if `user_id` holds one of its seats.
    pub async fn ensure_member(&self, code: &str, user_id: &str) -> Result<Room, RoomServiceError> {
        let room = self.get_room(code).await?;
        if room.player(user_id).is_none() {
            return Err(RoomServiceError::NotAMember);
        }
        Ok(room)
    }

    pub async fn create_room(&self, host_id: &str) -> Result<RoomView, RoomServiceError> {
        let code = self.codes.generate().await?;
        let room = Room::new(
            &code,
            host_id,
            self.settings.board_size,
            self.settings.win_length,
        );
        self.stores.rooms.create_room(&room).await.map_err(|e| {
            error!("Failed to create room {}: {}", code, e);
            RoomServiceError::from(e)
        })?;
        info!("Room {} created by {}", code, host_id);
        Ok(self.room_view(&room).await)
    }

    /// Creates a room for a matchmade pair: already playing, both ready, X to move.
    pub async fn create_matched_room(
        &self,
        x_user: &str,
        o_user: &str,
    ) -> Result<RoomView, RoomServiceError> {
        let code = self.codes.generate().await?;
        let mut room = Room::new(
            &code,
            x_user,
            self.settings.board_size,
            self.settings.win_length,
        );
        room.players[0].is_ready = true;
        room.players.push(PlayerSlot {
            user_id: o_user.to_string(),
            symbol: Symbol::O,
            is_ready: true,
        });
        let now = Utc::now();
        room.begin_game(now);

        self.stores.rooms.create_room(&room).await.map_err(|e| {
            error!("Failed to create matched room {}: {}", code, e);
            RoomServiceError::from(e)
        })?;
        self.timers
            .start(&code, now, self.settings.turn_seconds);
        info!("Matched room {} created for {} vs {}", code, x_user, o_user);
        Ok(self.room_view(&room).await)
    }

    pub async fn join_room(&self, code: &str, user_id: &str) -> Result<RoomView, RoomServiceError> {
        let lock = self.room_lock(code);
        let _guard = lock.lock().await;

        let mut room = self.get_room(code).await?;
        if room.player(user_id).is_some() {
            debug!("User {} rejoined room {}", user_id, code);
            self.rearm_if_playing(&room);
            return Ok(self.room_view(&room).await);
        }

        let symbol = match room.free_symbol() {
            Some(symbol) if !room.is_full() => symbol,
            _ => return Err(RoomServiceError::RoomFull),
        };
        room.players.push(PlayerSlot {
            user_id: user_id.to_string(),
            symbol,
            is_ready: false,
        });
        room.status = RoomStatus::Ready;
        room.winner = None;
        room.touch();
        self.stores.rooms.save_room(&room).await?;

        info!("User {} joined room {} as {:?}", user_id, code, symbol);
        Ok(self.room_view(&room).await)
    }

    /// Current state of a room. Re-arms the turn clock from the stored start time.
    pub async fn sync_room(&self, code: &str) -> Result<RoomView, RoomServiceError> {
        let lock = self.room_lock(code);
        let _guard = lock.lock().await;

        let room = self.get_room(code).await?;
        self.rearm_if_playing(&room);
        Ok(self.room_view(&room).await)
    }

    fn rearm_if_playing(&self, room: &Room) {
        if let (true, Some(started)) = (room.is_in_progress(), room.turn_started_at) {
            self.timers
                .start(&room.code, started, self.settings.turn_seconds);
        }
    }

    pub async fn set_ready(
        &self,
        code: &str,
        user_id: &str,
        ready: bool,
    ) -> Result<ReadyOutcome, RoomServiceError> {
        let lock = self.room_lock(code);
        let _guard = lock.lock().await;

        let mut room = self.get_room(code).await?;
        if room.is_in_progress() {
            return Err(RoomServiceError::AlreadyPlaying);
        }
        let slot = room.player_mut(user_id).ok_or(RoomServiceError::NotAMember)?;
        slot.is_ready = ready;
        room.touch();

        if room.all_ready() {
            self.begin_game(&mut room).await?;
            info!("Room {} started, both players ready", code);
            return Ok(ReadyOutcome {
                room: self.room_view(&room).await,
                started: true,
            });
        }

        self.stores.rooms.save_room(&room).await?;
        debug!("User {} set ready={} in room {}", user_id, ready, code);
        Ok(ReadyOutcome {
            room: self.room_view(&room).await,
            started: false,
        })
    }

    pub async fn start_game(&self, code: &str, user_id: &str) -> Result<RoomView, RoomServiceError> {
        let lock = self.room_lock(code);
        let _guard = lock.lock().await;

        let mut room = self.get_room(code).await?;
        if !room.is_host(user_id) {
            return Err(RoomServiceError::HostOnly);
        }
        if room.players.len() < 2 {
            return Err(RoomServiceError::NotEnoughPlayers);
        }
        if room.is_in_progress() {
            return Err(RoomServiceError::AlreadyPlaying);
        }
        if !room.all_ready() {
            return Err(RoomServiceError::PlayersNotReady);
        }

        self.begin_game(&mut room).await?;
        info!("Room {} started by host {}", code, user_id);
        Ok(self.room_view(&room).await)
    }

    /// Clears the previous game's moves and puts the room into play with X to move.
    async fn begin_game(&self, room: &mut Room) -> Result<(), RoomServiceError> {
        self.stores.moves.delete_moves(&room.code).await?;
        let now = Utc::now();
        let mut next = room.clone();
        next.begin_game(now);
        self.stores.rooms.save_room(&next).await?;
        *room = next;
        self.timers
            .start(&room.code, now, self.settings.turn_seconds);
        Ok(())
    }

    pub async fn leave_room(&self, code: &str, user_id: &str) -> Result<LeaveOutcome, RoomServiceError> {
        let lock = self.room_lock(code);
        let _guard = lock.lock().await;

        let mut room = self.get_room(code).await?;
        if room.is_host(user_id) {
            self.stores.rooms.delete_room(code).await?;
            self.timers.clear(code);
            if let Err(e) = self.stores.moves.delete_moves(code).await {
                error!("Failed to delete moves of closed room {}: {}", code, e);
            }
            if let Err(e) = self.stores.chat.delete_messages(code).await {
                error!("Failed to delete chat of closed room {}: {}", code, e);
            }
            info!("Host {} left, room {} closed", user_id, code);
            return Ok(LeaveOutcome::Closed);
        }

        let idx = match room.players.iter().position(|p| p.user_id == user_id) {
            Some(idx) => idx,
            None => return Ok(LeaveOutcome::NotSeated),
        };

        room.players.remove(idx);
        room.status = RoomStatus::Waiting;
        room.winner = None;
        room.turn = Symbol::X;
        room.turn_started_at = None;
        for player in &mut room.players {
            player.is_ready = false;
        }
        room.touch();

        self.timers.clear(code);
        self.stores.moves.delete_moves(code).await?;
        self.stores.rooms.save_room(&room).await?;
        info!("User {} left room {}", user_id, code);
        Ok(LeaveOutcome::Left(self.room_view(&room).await))
    }

    pub async fn list_moves(&self, code: &str) -> Result<Vec<GameMove>, RoomServiceError> {
        self.get_room(code).await?;
        Ok(self.stores.moves.list_moves(code).await?)
    }

    pub async fn submit_move(
        &self,
        code: &str,
        user_id: &str,
        x: i64,
        y: i64,
    ) -> Result<MoveOutcome, RoomServiceError> {
        let lock = self.room_lock(code);
        let _guard = lock.lock().await;

        let room = self.get_room(code).await?;
        match room.status {
            RoomStatus::Playing => {}
            RoomStatus::Finished => return Err(RoomServiceError::GameFinished),
            _ => return Err(RoomServiceError::GameNotStarted),
        }
        if room.winner.is_some() {
            return Err(RoomServiceError::GameFinished);
        }
        let slot = room.player(user_id).ok_or(RoomServiceError::NotAMember)?;
        if !room.in_bounds(x, y) {
            return Err(RoomServiceError::OutOfBounds);
        }
        if slot.symbol != room.turn {
            return Err(RoomServiceError::NotYourTurn);
        }

        let coord = Coord {
            x: x as usize,
            y: y as usize,
        };
        let log = self.stores.moves.list_moves(code).await?;
        let mut board = Board::from_moves(room.board_size, &log);
        if board.get(coord).is_some() {
            return Err(RoomServiceError::CellOccupied);
        }
        board.place(coord, room.turn);
        let evaluation = self.rules.evaluate(&board, coord, room.win_length);

        let game_move = self
            .stores
            .moves
            .append_move(GameMove::new(code, coord.x, coord.y, room.turn, user_id))
            .await
            .map_err(|e| match e {
                GameRepositoryError::Conflict(_) => RoomServiceError::CellOccupied,
                other => RoomServiceError::from(other),
            })?;
        debug!(
            "Room {} move {} by {} at ({}, {})",
            code, game_move.seq, user_id, coord.x, coord.y
        );

        let outcome = match evaluation.winner {
            Some(winner) => Some(Outcome::win_for(winner)),
            None if board.is_full() => Some(Outcome::Draw),
            None => None,
        };
        if let Some(outcome) = outcome {
            // finalize only fails before the room is saved as finished
            return match self
                .finalize(
                    room,
                    outcome,
                    EndReason::Normal,
                    evaluation.winning_line,
                    Some(game_move.clone()),
                )
                .await
            {
                Ok(summary) => Ok(MoveOutcome::Finished(summary)),
                Err(e) => {
                    self.undo_move(&game_move).await;
                    Err(e)
                }
            };
        }

        let mut room = room;
        let now = Utc::now();
        room.turn = room.turn.other();
        room.turn_started_at = Some(now);
        room.updated_at = now;
        if let Err(e) = self.stores.rooms.save_room(&room).await {
            self.undo_move(&game_move).await;
            return Err(e.into());
        }
        self.timers.start(code, now, self.settings.turn_seconds);

        Ok(MoveOutcome::Continued {
            room: self.room_view(&room).await,
            last_move: game_move,
        })
    }

    /// Drops a move whose turn could not be committed.
    async fn undo_move(&self, game_move: &GameMove) {
        if let Err(e) = self
            .stores
            .moves
            .remove_move(&game_move.room_code, game_move.seq)
            .await
        {
            error!(
                "Failed to roll back move {} of room {}: {}",
                game_move.seq, game_move.room_code, e
            );
        }
    }

    /// Ends the game on an expired turn clock. Returns `None` when the expiry is stale.
    pub async fn handle_turn_timeout(
        &self,
        expired: &TurnExpired,
    ) -> Result<Option<MatchSummary>, RoomServiceError> {
        let lock = self.room_lock(&expired.room_code);
        let _guard = lock.lock().await;

        let room = match self.stores.rooms.get_room(&expired.room_code).await {
            Ok(room) => room,
            Err(GameRepositoryError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !room.is_in_progress() || room.turn_started_at != Some(expired.turn_started_at) {
            debug!("Ignoring stale turn expiry for room {}", expired.room_code);
            return Ok(None);
        }

        let winner = Outcome::win_for(room.turn.other());
        info!(
            "Room {}: {:?} ran out of time",
            expired.room_code, room.turn
        );
        let summary = self
            .finalize(room, winner, EndReason::Timeout, None, None)
            .await?;
        Ok(Some(summary))
    }

    /// Records the end of a game: room state, ratings, the match record and move tags.
    async fn finalize(
        &self,
        mut room: Room,
        outcome: Outcome,
        reason: EndReason,
        winning_line: Option<Vec<Coord>>,
        last_move: Option<GameMove>,
    ) -> Result<MatchSummary, RoomServiceError> {
        room.finish(outcome, Utc::now());
        self.stores.rooms.save_room(&room).await?;
        self.timers.clear(&room.code);

        let rating_deltas = match self.apply_ratings(&room, outcome).await {
            Ok(deltas) => deltas,
            Err(e) => {
                error!("Failed to update ratings for room {}: {}", room.code, e);
                None
            }
        };

        let players = room
            .players
            .iter()
            .map(|p| MatchPlayer {
                user_id: p.user_id.clone(),
                symbol: p.symbol,
            })
            .collect();
        let game_match = GameMatch::new(&room.code, players, outcome, reason);
        let match_id = match self.stores.matches.create_match(&game_match).await {
            Ok(()) => {
                if let Err(e) = self
                    .stores
                    .moves
                    .assign_match(&room.code, &game_match.id)
                    .await
                {
                    error!("Failed to tag moves of room {}: {}", room.code, e);
                }
                Some(game_match.id)
            }
            Err(e) => {
                error!("Failed to record match for room {}: {}", room.code, e);
                None
            }
        };

        info!(
            "Room {} finished: {:?} ({:?})",
            room.code, outcome, reason
        );
        Ok(MatchSummary {
            match_id,
            room: self.room_view(&room).await,
            outcome,
            winning_line,
            last_move,
            reason,
            rating_deltas,
        })
    }

    async fn apply_ratings(
        &self,
        room: &Room,
        outcome: Outcome,
    ) -> Result<Option<RatingDeltas>, RoomServiceError> {
        let (x_slot, o_slot) = match (
            room.player_with_symbol(Symbol::X),
            room.player_with_symbol(Symbol::O),
        ) {
            (Some(x), Some(o)) => (x, o),
            _ => return Ok(None),
        };

        let x_user = self.stores.users.get_user_by_id(&x_slot.user_id).await;
        let o_user = self.stores.users.get_user_by_id(&o_slot.user_id).await;
        let (x_user, o_user) = match (x_user, o_user) {
            (Ok(x), Ok(o)) => (x, o),
            _ => {
                warn!("Skipping rating update for room {}, player missing", room.code);
                return Ok(None);
            }
        };

        let (delta_x, delta_o) =
            self.ratings
                .deltas(x_user.rating, o_user.rating, outcome.score_for_x());
        self.stores
            .users
            .apply_rating_deltas(&[
                (x_user.id.clone(), delta_x),
                (o_user.id.clone(), delta_o),
            ])
            .await?;

        Ok(Some(RatingDeltas {
            x: RatingChange {
                user_id: x_user.id,
                delta: delta_x,
                rating: x_user.rating + delta_x,
            },
            o: RatingChange {
                user_id: o_user.id,
                delta: delta_o,
                rating: o_user.rating + delta_o,
            },
        }))
    }
}
