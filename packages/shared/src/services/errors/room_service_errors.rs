use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;

pub const OPERATION_FAILED: &str = "Operation failed";

#[derive(Debug)]
pub enum RoomServiceError {
    RoomNotFound,
    RoomFull,
    NotAMember,
    HostOnly,
    NotEnoughPlayers,
    PlayersNotReady,
    AlreadyPlaying,
    GameNotStarted,
    GameFinished,
    NotYourTurn,
    OutOfBounds,
    CellOccupied,
    RepositoryError(GameRepositoryError),
    UserRepositoryError(UserRepositoryError),
    OperationFailed(String),
}

impl RoomServiceError {
    /// Message safe to show to the player; collaborator failures are not exposed.
    pub fn user_message(&self) -> String {
        match self {
            RoomServiceError::RepositoryError(_)
            | RoomServiceError::UserRepositoryError(_)
            | RoomServiceError::OperationFailed(_) => OPERATION_FAILED.to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for RoomServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomServiceError::RoomNotFound => write!(f, "Room does not exist"),
            RoomServiceError::RoomFull => write!(f, "Room already has 2 players"),
            RoomServiceError::NotAMember => write!(f, "You are not in this room"),
            RoomServiceError::HostOnly => write!(f, "Only the host can start the game"),
            RoomServiceError::NotEnoughPlayers => write!(f, "Waiting for a second player"),
            RoomServiceError::PlayersNotReady => write!(f, "Both players must be ready"),
            RoomServiceError::AlreadyPlaying => write!(f, "Game is already in progress"),
            RoomServiceError::GameNotStarted => write!(f, "Game has not started"),
            RoomServiceError::GameFinished => write!(f, "Game is already over"),
            RoomServiceError::NotYourTurn => write!(f, "Not your turn"),
            RoomServiceError::OutOfBounds => write!(f, "Move is outside the board"),
            RoomServiceError::CellOccupied => write!(f, "Cell is already taken"),
            RoomServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
            RoomServiceError::UserRepositoryError(err) => {
                write!(f, "User repository error: {}", err)
            }
            RoomServiceError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
        }
    }
}

impl std::error::Error for RoomServiceError {}

impl From<GameRepositoryError> for RoomServiceError {
    fn from(err: GameRepositoryError) -> Self {
        match err {
            GameRepositoryError::NotFound(_) => RoomServiceError::RoomNotFound,
            other => RoomServiceError::RepositoryError(other),
        }
    }
}

impl From<UserRepositoryError> for RoomServiceError {
    fn from(err: UserRepositoryError) -> Self {
        RoomServiceError::UserRepositoryError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_shown_verbatim() {
        assert_eq!(RoomServiceError::NotYourTurn.user_message(), "Not your turn");
    }

    #[test]
    fn test_collaborator_failures_are_hidden() {
        let err = RoomServiceError::from(GameRepositoryError::DynamoDb("timeout".to_string()));

        assert_eq!(err.user_message(), OPERATION_FAILED);
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_missing_record_maps_to_room_not_found() {
        let err = RoomServiceError::from(GameRepositoryError::NotFound("Room 1".to_string()));

        assert!(matches!(err, RoomServiceError::RoomNotFound));
    }
}
