use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[derive(Debug)]
pub enum MatchServiceError {
    RepositoryError(GameRepositoryError),
}

impl std::fmt::Display for MatchServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
        }
    }
}

impl std::error::Error for MatchServiceError {}

impl From<GameRepositoryError> for MatchServiceError {
    fn from(err: GameRepositoryError) -> Self {
        MatchServiceError::RepositoryError(err)
    }
}
