use std::sync::Arc;

use rand::Rng;
use tracing::warn;

use crate::repositories::room_repository::RoomRepository;
use crate::services::errors::room_service_errors::RoomServiceError;

const MAX_ATTEMPTS: usize = 32;

/// Hands out six-digit room codes that are not in use.
#[derive(Clone)]
pub struct RoomCodeService {
    repository: Arc<dyn RoomRepository + Send + Sync>,
}

impl RoomCodeService {
    pub fn new(repository: Arc<dyn RoomRepository + Send + Sync>) -> Self {
        RoomCodeService { repository }
    }

    pub fn random_code() -> String {
        rand::thread_rng().gen_range(100_000..=999_999).to_string()
    }

    pub async fn generate(&self) -> Result<String, RoomServiceError> {
        for _ in 0..MAX_ATTEMPTS {
            let code = Self::random_code();
            if !self.repository.room_exists(&code).await? {
                return Ok(code);
            }
            warn!("Room code {} already in use, retrying", code);
        }
        Err(RoomServiceError::OperationFailed(
            "Could not allocate a room code".to_string(),
        ))
    }
}
