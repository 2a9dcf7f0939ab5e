use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::room::Room;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create_room(&self, room: &Room) -> Result<(), GameRepositoryError>;
    async fn get_room(&self, code: &str) -> Result<Room, GameRepositoryError>;
    async fn save_room(&self, room: &Room) -> Result<(), GameRepositoryError>;
    async fn delete_room(&self, code: &str) -> Result<(), GameRepositoryError>;
    async fn room_exists(&self, code: &str) -> Result<bool, GameRepositoryError>;
}

/// Rooms are owned by the process that hosts their connections, so they live in memory.
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<String, Room>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(&self, room: &Room) -> Result<(), GameRepositoryError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room.code) {
            return Err(GameRepositoryError::AlreadyExists(format!(
                "Room {}",
                room.code
            )));
        }
        rooms.insert(room.code.clone(), room.clone());
        Ok(())
    }

    async fn get_room(&self, code: &str) -> Result<Room, GameRepositoryError> {
        self.rooms
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| GameRepositoryError::NotFound(format!("Room {}", code)))
    }

    async fn save_room(&self, room: &Room) -> Result<(), GameRepositoryError> {
        let mut rooms = self.rooms.write().await;
        match rooms.get_mut(&room.code) {
            Some(stored) => {
                *stored = room.clone();
                Ok(())
            }
            None => Err(GameRepositoryError::NotFound(format!("Room {}", room.code))),
        }
    }

    async fn delete_room(&self, code: &str) -> Result<(), GameRepositoryError> {
        self.rooms.write().await.remove(code);
        Ok(())
    }

    async fn room_exists(&self, code: &str) -> Result<bool, GameRepositoryError> {
        Ok(self.rooms.read().await.contains_key(code))
    }
}
