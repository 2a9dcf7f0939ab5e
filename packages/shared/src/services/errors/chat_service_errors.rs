use crate::models::chat::MAX_CHAT_LEN;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::services::errors::room_service_errors::{RoomServiceError, OPERATION_FAILED};

#[derive(Debug)]
pub enum ChatServiceError {
    EmptyMessage,
    MessageTooLong,
    Room(RoomServiceError),
    RepositoryError(GameRepositoryError),
}

impl ChatServiceError {
    pub fn user_message(&self) -> String {
        match self {
            ChatServiceError::Room(err) => err.user_message(),
            ChatServiceError::RepositoryError(_) => OPERATION_FAILED.to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for ChatServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatServiceError::EmptyMessage => write!(f, "Message cannot be empty"),
            ChatServiceError::MessageTooLong => {
                write!(f, "Message exceeds {} characters", MAX_CHAT_LEN)
            }
            ChatServiceError::Room(err) => write!(f, "{}", err),
            ChatServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
        }
    }
}

impl std::error::Error for ChatServiceError {}

impl From<RoomServiceError> for ChatServiceError {
    fn from(err: RoomServiceError) -> Self {
        ChatServiceError::Room(err)
    }
}

impl From<GameRepositoryError> for ChatServiceError {
    fn from(err: GameRepositoryError) -> Self {
        ChatServiceError::RepositoryError(err)
    }
}
