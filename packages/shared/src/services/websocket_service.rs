use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::models::events::ServerEvent;
use crate::repositories::errors::websocket_repository_errors::WebSocketRepositoryError;
use crate::repositories::websocket_repository::WebSocketRepository;

/// Fan-out of server events to live connections.
#[derive(Clone)]
pub struct WebSocketService {
    repository: Arc<dyn WebSocketRepository>,
}

impl WebSocketService {
    pub fn new(repository: Arc<dyn WebSocketRepository>) -> Self {
        Self { repository }
    }

    pub async fn store_connection(
        &self,
        connection_id: &str,
        user_id: &str,
        sender: UnboundedSender<ServerEvent>,
    ) {
        info!("Storing WebSocket connection {} for user {}", connection_id, user_id);
        self.repository
            .store_connection(connection_id, user_id, sender)
            .await
    }

    /// Returns the rooms the connection was listening to.
    pub async fn remove_connection(&self, connection_id: &str) -> Vec<String> {
        info!("Removing WebSocket connection {}", connection_id);
        self.repository.remove_connection(connection_id).await
    }

    pub async fn subscribe(&self, room_code: &str, connection_id: &str) {
        self.repository.subscribe(room_code, connection_id).await
    }

    pub async fn unsubscribe(&self, room_code: &str, connection_id: &str) {
        self.repository.unsubscribe(room_code, connection_id).await
    }

    pub async fn clear_room(&self, room_code: &str) {
        self.repository.clear_room(room_code).await
    }

    pub async fn user_for_connection(&self, connection_id: &str) -> Option<String> {
        self.repository.user_for_connection(connection_id).await
    }

    pub async fn send_message(
        &self,
        connection_id: &str,
        event: &ServerEvent,
    ) -> Result<(), WebSocketRepositoryError> {
        self.repository.send_message(connection_id, event).await
    }

    /// Best effort: a send that fails is logged and skipped.
    pub async fn notify(&self, connection_id: &str, event: &ServerEvent) {
        if let Err(e) = self.send_message(connection_id, event).await {
            warn!("Failed to notify connection {}: {}", connection_id, e);
        }
    }

    /// Sends to every connection subscribed to the room. Returns how many were reached.
    pub async fn broadcast(&self, room_code: &str, event: &ServerEvent) -> usize {
        let connections = self.repository.room_connections(room_code).await;
        let mut delivered = 0;
        for connection_id in &connections {
            match self.repository.send_message(connection_id, event).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Failed to broadcast to {} in room {}: {}", connection_id, room_code, e),
            }
        }
        debug!(
            "Broadcast to room {} reached {}/{} connections",
            room_code,
            delivered,
            connections.len()
        );
        delivered
    }
}
