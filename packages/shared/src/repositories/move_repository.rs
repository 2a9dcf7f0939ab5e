use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::game_move::GameMove;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MoveRepository: Send + Sync {
    /// Stores the move with the next sequence number for its room and returns it.
    async fn append_move(&self, game_move: GameMove) -> Result<GameMove, GameRepositoryError>;
    /// All moves of a room in sequence order.
    async fn list_moves(&self, room_code: &str) -> Result<Vec<GameMove>, GameRepositoryError>;
    /// Removes one move by sequence number. Missing moves are not an error.
    async fn remove_move(&self, room_code: &str, seq: u32) -> Result<(), GameRepositoryError>;
    async fn delete_moves(&self, room_code: &str) -> Result<(), GameRepositoryError>;
    /// Tags every untagged move of the room with the finished match id.
    async fn assign_match(&self, room_code: &str, match_id: &str)
        -> Result<usize, GameRepositoryError>;
}

#[derive(Default)]
pub struct InMemoryMoveRepository {
    moves: RwLock<HashMap<String, Vec<GameMove>>>,
}

impl InMemoryMoveRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MoveRepository for InMemoryMoveRepository {
    async fn append_move(&self, mut game_move: GameMove) -> Result<GameMove, GameRepositoryError> {
        let mut moves = self.moves.write().await;
        let log = moves.entry(game_move.room_code.clone()).or_default();
        if log
            .iter()
            .any(|m| m.match_id.is_none() && m.x == game_move.x && m.y == game_move.y)
        {
            return Err(GameRepositoryError::Conflict(format!(
                "Cell ({}, {}) is already occupied",
                game_move.x, game_move.y
            )));
        }
        game_move.seq = log.last().map_or(1, |m| m.seq + 1);
        log.push(game_move.clone());
        Ok(game_move)
    }

    async fn list_moves(&self, room_code: &str) -> Result<Vec<GameMove>, GameRepositoryError> {
        Ok(self
            .moves
            .read()
            .await
            .get(room_code)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_move(&self, room_code: &str, seq: u32) -> Result<(), GameRepositoryError> {
        if let Some(log) = self.moves.write().await.get_mut(room_code) {
            log.retain(|m| m.seq != seq);
        }
        Ok(())
    }

    async fn delete_moves(&self, room_code: &str) -> Result<(), GameRepositoryError> {
        self.moves.write().await.remove(room_code);
        Ok(())
    }

    async fn assign_match(
        &self,
        room_code: &str,
        match_id: &str,
    ) -> Result<usize, GameRepositoryError> {
        let mut moves = self.moves.write().await;
        let mut tagged = 0;
        if let Some(log) = moves.get_mut(room_code) {
            for game_move in log.iter_mut().filter(|m| m.match_id.is_none()) {
                game_move.match_id = Some(match_id.to_string());
                tagged += 1;
            }
        }
        Ok(tagged)
    }
}
