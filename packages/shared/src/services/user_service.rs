use std::sync::Arc;

use crate::models::user::{User, UserProfile};
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::user_service_errors::UserServiceError;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        UserService { repository }
    }

    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, UserServiceError> {
        let username = username.trim();
        if username.is_empty() || password_hash.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username or password cannot be empty".to_string(),
            ));
        }
        if self.repository.username_exists(username).await? {
            return Err(UserServiceError::UserAlreadyExists);
        }
        let user = User::new(username.to_string(), password_hash.to_string());
        self.repository.create_user(&user).await?;
        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserServiceError> {
        if user_id.is_empty() {
            return Err(UserServiceError::ValidationError(
                "User ID cannot be empty".to_string(),
            ));
        }
        Ok(self.repository.get_user_by_id(user_id).await?)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<User, UserServiceError> {
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        Ok(self.repository.get_user_by_username(username).await?)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, UserServiceError> {
        Ok(self.get_user_by_id(user_id).await?.profile())
    }

    /// Top players by rating. `None` or zero means the default size; capped at 100.
    pub async fn leaderboard(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<UserProfile>, UserServiceError> {
        let limit = match limit {
            Some(0) | None => DEFAULT_LEADERBOARD_LIMIT,
            Some(n) => n.min(MAX_LEADERBOARD_LIMIT),
        };
        let users = self.repository.top_by_rating(limit).await?;
        Ok(users.iter().map(User::profile).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::errors::user_repository_errors::UserRepositoryError;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_create_user_rejects_taken_username() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_username_exists()
            .with(eq("alice"))
            .returning(|_| Ok(true));
        repository.expect_create_user().never();

        let result = UserService::new(Arc::new(repository))
            .create_user("alice", "salt$hash")
            .await;

        assert!(matches!(result, Err(UserServiceError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_create_user_trims_username() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_username_exists()
            .with(eq("alice"))
            .returning(|_| Ok(false));
        repository.expect_create_user().times(1).returning(|_| Ok(()));

        let user = UserService::new(Arc::new(repository))
            .create_user("  alice ", "salt$hash")
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.rating, 1000);
    }

    #[tokio::test]
    async fn test_create_user_validates_input() {
        let repository = MockUserRepository::new();

        let result = UserService::new(Arc::new(repository))
            .create_user("   ", "salt$hash")
            .await;

        assert!(matches!(result, Err(UserServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_missing_user_maps_to_not_found() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_get_user_by_id()
            .returning(|_| Err(UserRepositoryError::NotFound));

        let result = UserService::new(Arc::new(repository))
            .get_profile("ghost")
            .await;

        assert!(matches!(result, Err(UserServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_storage_failure_maps_to_repository_error() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_get_user_by_id()
            .returning(|_| Err(UserRepositoryError::DynamoDb("throttled".to_string())));

        let result = UserService::new(Arc::new(repository))
            .get_user_by_id("u1")
            .await;

        assert!(matches!(result, Err(UserServiceError::RepositoryError(_))));
    }

    #[tokio::test]
    async fn test_leaderboard_limits() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_top_by_rating()
            .with(eq(DEFAULT_LEADERBOARD_LIMIT))
            .times(2)
            .returning(|_| Ok(Vec::new()));
        repository
            .expect_top_by_rating()
            .with(eq(MAX_LEADERBOARD_LIMIT))
            .times(1)
            .returning(|_| Ok(Vec::new()));
        repository
            .expect_top_by_rating()
            .with(eq(25))
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let service = UserService::new(Arc::new(repository));

        service.leaderboard(None).await.unwrap();
        service.leaderboard(Some(0)).await.unwrap();
        service.leaderboard(Some(1000)).await.unwrap();
        service.leaderboard(Some(25)).await.unwrap();
    }
}
