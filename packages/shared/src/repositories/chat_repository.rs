use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::chat::ChatMessage;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn append_message(&self, message: &ChatMessage) -> Result<(), GameRepositoryError>;
    /// The last `limit` messages of a room, oldest first.
    async fn recent_messages(
        &self,
        room_code: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, GameRepositoryError>;
    async fn delete_messages(&self, room_code: &str) -> Result<(), GameRepositoryError>;
}

#[derive(Default)]
pub struct InMemoryChatRepository {
    messages: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn append_message(&self, message: &ChatMessage) -> Result<(), GameRepositoryError> {
        self.messages
            .write()
            .await
            .entry(message.room_code.clone())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn recent_messages(
        &self,
        room_code: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, GameRepositoryError> {
        let messages = self.messages.read().await;
        let log = match messages.get(room_code) {
            Some(log) => log,
            None => return Ok(Vec::new()),
        };
        let skip = log.len().saturating_sub(limit);
        Ok(log[skip..].to_vec())
    }

    async fn delete_messages(&self, room_code: &str) -> Result<(), GameRepositoryError> {
        self.messages.write().await.remove(room_code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recent_messages_keeps_tail_in_order() {
        let repository = InMemoryChatRepository::new();
        for text in ["one", "two", "three"] {
            repository
                .append_message(&ChatMessage::new("r1", "u1", "alice", text))
                .await
                .unwrap();
        }

        let recent = repository.recent_messages("r1", 2).await.unwrap();

        let texts: Vec<&str> = recent.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
    }

    #[tokio::test]
    async fn test_unknown_room_has_no_history() {
        let repository = InMemoryChatRepository::new();

        assert!(repository.recent_messages("nope", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_messages() {
        let repository = InMemoryChatRepository::new();
        repository
            .append_message(&ChatMessage::new("r1", "u1", "alice", "hi"))
            .await
            .unwrap();

        repository.delete_messages("r1").await.unwrap();

        assert!(repository.recent_messages("r1", 10).await.unwrap().is_empty());
    }
}
