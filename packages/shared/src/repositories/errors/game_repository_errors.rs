/// Errors shared by the room, move, match and chat stores.
#[derive(Debug)]
pub enum GameRepositoryError {
    NotFound(String),
    AlreadyExists(String),
    Conflict(String),
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for GameRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameRepositoryError::NotFound(what) => write!(f, "{} not found", what),
            GameRepositoryError::AlreadyExists(what) => write!(f, "{} already exists", what),
            GameRepositoryError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            GameRepositoryError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            GameRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for GameRepositoryError {}
