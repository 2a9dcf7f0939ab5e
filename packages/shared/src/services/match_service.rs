use std::sync::Arc;

use crate::models::game_match::GameMatch;
use crate::repositories::match_repository::MatchRepository;
use crate::services::errors::match_service_errors::MatchServiceError;

pub const MATCH_HISTORY_LIMIT: usize = 50;

pub struct MatchService {
    repository: Arc<dyn MatchRepository + Send + Sync>,
}

impl MatchService {
    pub fn new(repository: Arc<dyn MatchRepository + Send + Sync>) -> Self {
        MatchService { repository }
    }

    /// Finished games the user played in, newest first.
    pub async fn history(&self, user_id: &str) -> Result<Vec<GameMatch>, MatchServiceError> {
        Ok(self
            .repository
            .list_matches_for_user(user_id, MATCH_HISTORY_LIMIT)
            .await?)
    }
}
