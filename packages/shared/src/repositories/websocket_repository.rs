use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::events::ServerEvent;
use crate::repositories::errors::websocket_repository_errors::WebSocketRepositoryError;

/// Registry of live connections and the rooms each one listens to.
#[async_trait]
pub trait WebSocketRepository: Send + Sync {
    async fn store_connection(
        &self,
        connection_id: &str,
        user_id: &str,
        sender: UnboundedSender<ServerEvent>,
    );

    /// Forgets the connection and returns the rooms it was subscribed to.
    async fn remove_connection(&self, connection_id: &str) -> Vec<String>;

    async fn subscribe(&self, room_code: &str, connection_id: &str);

    async fn unsubscribe(&self, room_code: &str, connection_id: &str);

    /// Drops every subscription of a room.
    async fn clear_room(&self, room_code: &str);

    async fn room_connections(&self, room_code: &str) -> Vec<String>;

    async fn user_for_connection(&self, connection_id: &str) -> Option<String>;

    async fn send_message(
        &self,
        connection_id: &str,
        event: &ServerEvent,
    ) -> Result<(), WebSocketRepositoryError>;
}

struct Connection {
    user_id: String,
    sender: UnboundedSender<ServerEvent>,
    rooms: HashSet<String>,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<String, Connection>,
    rooms: HashMap<String, HashSet<String>>,
}

#[derive(Default)]
pub struct InMemoryWebSocketRepository {
    registry: RwLock<Registry>,
}

impl InMemoryWebSocketRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebSocketRepository for InMemoryWebSocketRepository {
    async fn store_connection(
        &self,
        connection_id: &str,
        user_id: &str,
        sender: UnboundedSender<ServerEvent>,
    ) {
        let mut registry = self.registry.write().await;
        registry.connections.insert(
            connection_id.to_string(),
            Connection {
                user_id: user_id.to_string(),
                sender,
                rooms: HashSet::new(),
            },
        );
        debug!("Stored connection {} for user {}", connection_id, user_id);
    }

    async fn remove_connection(&self, connection_id: &str) -> Vec<String> {
        let mut registry = self.registry.write().await;
        let rooms: Vec<String> = match registry.connections.remove(connection_id) {
            Some(connection) => connection.rooms.into_iter().collect(),
            None => return Vec::new(),
        };
        for room_code in &rooms {
            if let Some(members) = registry.rooms.get_mut(room_code) {
                members.remove(connection_id);
                if members.is_empty() {
                    registry.rooms.remove(room_code);
                }
            }
        }
        rooms
    }

    async fn subscribe(&self, room_code: &str, connection_id: &str) {
        let mut registry = self.registry.write().await;
        match registry.connections.get_mut(connection_id) {
            Some(connection) => {
                connection.rooms.insert(room_code.to_string());
            }
            None => return,
        }
        registry
            .rooms
            .entry(room_code.to_string())
            .or_default()
            .insert(connection_id.to_string());
    }

    async fn unsubscribe(&self, room_code: &str, connection_id: &str) {
        let mut registry = self.registry.write().await;
        if let Some(connection) = registry.connections.get_mut(connection_id) {
            connection.rooms.remove(room_code);
        }
        if let Some(members) = registry.rooms.get_mut(room_code) {
            members.remove(connection_id);
            if members.is_empty() {
                registry.rooms.remove(room_code);
            }
        }
    }

    async fn clear_room(&self, room_code: &str) {
        let mut registry = self.registry.write().await;
        if let Some(members) = registry.rooms.remove(room_code) {
            for connection_id in members {
                if let Some(connection) = registry.connections.get_mut(&connection_id) {
                    connection.rooms.remove(room_code);
                }
            }
        }
    }

    async fn room_connections(&self, room_code: &str) -> Vec<String> {
        self.registry
            .read()
            .await
            .rooms
            .get(room_code)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn user_for_connection(&self, connection_id: &str) -> Option<String> {
        self.registry
            .read()
            .await
            .connections
            .get(connection_id)
            .map(|c| c.user_id.clone())
    }

    async fn send_message(
        &self,
        connection_id: &str,
        event: &ServerEvent,
    ) -> Result<(), WebSocketRepositoryError> {
        let registry = self.registry.read().await;
        let connection = registry
            .connections
            .get(connection_id)
            .ok_or_else(|| WebSocketRepositoryError::NotConnected(connection_id.to_string()))?;
        connection
            .sender
            .send(event.clone())
            .map_err(|_| WebSocketRepositoryError::SendFailed(connection_id.to_string()))
    }
}
