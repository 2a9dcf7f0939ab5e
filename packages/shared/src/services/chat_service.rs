use std::sync::Arc;

use tracing::{debug, error};

use crate::models::chat::{ChatMessage, DEFAULT_CHAT_HISTORY, MAX_CHAT_LEN};
use crate::repositories::chat_repository::ChatRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::chat_service_errors::ChatServiceError;
use crate::services::errors::room_service_errors::RoomServiceError;
use crate::services::room_service::RoomService;

pub struct ChatService {
    repository: Arc<dyn ChatRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
    room_service: Arc<RoomService>,
}

impl ChatService {
    pub fn new(
        repository: Arc<dyn ChatRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
        room_service: Arc<RoomService>,
    ) -> Self {
        ChatService {
            repository,
            users,
            room_service,
        }
    }

    /// Stores a message from a seated player. Text is trimmed, never truncated.
    pub async fn send(
        &self,
        room_code: &str,
        user_id: &str,
        text: &str,
    ) -> Result<ChatMessage, ChatServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatServiceError::EmptyMessage);
        }
        if text.chars().count() > MAX_CHAT_LEN {
            return Err(ChatServiceError::MessageTooLong);
        }

        self.room_service.ensure_member(room_code, user_id).await?;
        let user = self.users.get_user_by_id(user_id).await.map_err(|e| {
            error!("Failed to load sender {} for chat: {}", user_id, e);
            RoomServiceError::from(e)
        })?;

        let message = ChatMessage::new(room_code, user_id, &user.username, text);
        self.repository.append_message(&message).await?;
        debug!("Chat message {} in room {}", message.id, room_code);
        Ok(message)
    }

    /// The newest messages of a room, oldest first.
    pub async fn history(
        &self,
        room_code: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>, ChatServiceError> {
        let limit = match limit {
            Some(0) | None => DEFAULT_CHAT_HISTORY,
            Some(n) => n,
        };
        self.room_service.get_room(room_code).await?;
        Ok(self.repository.recent_messages(room_code, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::room_service::tests::{harness, Harness};

    fn chat(h: &Harness) -> ChatService {
        ChatService::new(
            h.stores.chat.clone(),
            h.stores.users.clone(),
            h.service.clone(),
        )
    }

    #[tokio::test]
    async fn test_send_trims_and_uses_username() {
        let h = harness().await;
        let code = h.service.create_room(&h.alice.id).await.unwrap().code;

        let message = chat(&h).send(&code, &h.alice.id, "  hello  ").await.unwrap();

        assert_eq!(message.text, "hello");
        assert_eq!(message.username, "alice");
        assert_eq!(message.room_code, code);
    }

    #[tokio::test]
    async fn test_send_rejects_blank_and_oversized_text() {
        let h = harness().await;
        let code = h.service.create_room(&h.alice.id).await.unwrap().code;
        let service = chat(&h);

        assert!(matches!(
            service.send(&code, &h.alice.id, "   ").await,
            Err(ChatServiceError::EmptyMessage)
        ));
        let long = "a".repeat(MAX_CHAT_LEN + 1);
        assert!(matches!(
            service.send(&code, &h.alice.id, &long).await,
            Err(ChatServiceError::MessageTooLong)
        ));
        let exact = "a".repeat(MAX_CHAT_LEN);
        assert!(service.send(&code, &h.alice.id, &exact).await.is_ok());
        assert_eq!(service.history(&code, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_requires_a_seat() {
        let h = harness().await;
        let code = h.service.create_room(&h.alice.id).await.unwrap().code;

        let result = chat(&h).send(&code, &h.carol.id, "hi").await;

        assert!(matches!(
            result,
            Err(ChatServiceError::Room(RoomServiceError::NotAMember))
        ));
    }

    #[tokio::test]
    async fn test_history_of_missing_room() {
        let h = harness().await;

        let result = chat(&h).history("000000", None).await;

        assert!(matches!(
            result,
            Err(ChatServiceError::Room(RoomServiceError::RoomNotFound))
        ));
    }

    #[tokio::test]
    async fn test_history_returns_latest_in_order() {
        let h = harness().await;
        let code = h.service.create_room(&h.alice.id).await.unwrap().code;
        h.service.join_room(&code, &h.bob.id).await.unwrap();
        let service = chat(&h);
        for (user, text) in [(&h.alice, "one"), (&h.bob, "two"), (&h.alice, "three")] {
            service.send(&code, &user.id, text).await.unwrap();
        }

        let history = service.history(&code, Some(2)).await.unwrap();

        let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(history[0].username, "bob");
    }
}
