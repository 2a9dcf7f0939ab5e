use crate::services::errors::room_service_errors::{RoomServiceError, OPERATION_FAILED};

#[derive(Debug)]
pub enum MatchmakingServiceError {
    AlreadyQueued,
    RoomService(RoomServiceError),
}

impl MatchmakingServiceError {
    pub fn user_message(&self) -> String {
        match self {
            MatchmakingServiceError::AlreadyQueued => self.to_string(),
            MatchmakingServiceError::RoomService(_) => OPERATION_FAILED.to_string(),
        }
    }
}

impl std::fmt::Display for MatchmakingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchmakingServiceError::AlreadyQueued => write!(f, "Already searching for a match"),
            MatchmakingServiceError::RoomService(err) => write!(f, "Room service error: {}", err),
        }
    }
}

impl std::error::Error for MatchmakingServiceError {}

impl From<RoomServiceError> for MatchmakingServiceError {
    fn from(err: RoomServiceError) -> Self {
        MatchmakingServiceError::RoomService(err)
    }
}
