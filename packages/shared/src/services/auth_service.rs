use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::auth::responses::{LoginResponse, TokenClaims};
use crate::models::user::User;

use crate::services::errors::auth_service_errors::AuthServiceError;
use crate::services::errors::user_service_errors::UserServiceError;
use crate::services::user_service::UserService;

const TOKEN_TTL_HOURS: i64 = 24;
const SALT_LEN: usize = 16;

pub trait AuthServiceTrait: Send + Sync {
    async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthServiceError>;
    async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthServiceError>;
    fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthServiceError>;
    fn extract_user_id_from_token(&self, token: &str) -> Result<String, AuthServiceError>;
    fn generate_token(&self, user: &User) -> Result<LoginResponse, AuthServiceError>;
}

pub struct AuthService {
    user_service: Arc<UserService>,
    jwt_secret: String,
}

impl AuthService {
    pub fn with_jwt_secret(user_service: Arc<UserService>, jwt_secret: String) -> Self {
        AuthService {
            user_service,
            jwt_secret,
        }
    }
}

/// Salted SHA-256, stored as `salt$hexdigest`.
pub fn hash_password(password: &str) -> String {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();
    format!("{}${}", salt, digest(&salt, password))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

fn validate_credentials(username: &str, password: &str) -> Result<(), AuthServiceError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AuthServiceError::ValidationError(
            "Username and password are required".to_string(),
        ));
    }
    Ok(())
}

impl AuthServiceTrait for AuthService {
    async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthServiceError> {
        validate_credentials(username, password)?;

        let user = self
            .user_service
            .create_user(username, &hash_password(password))
            .await?;
        info!("Registered user {} ({})", user.username, user.id);
        self.generate_token(&user)
    }

    async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthServiceError> {
        validate_credentials(username, password)?;

        match self.user_service.get_user_by_username(username.trim()).await {
            Ok(user) => {
                if verify_password(password, &user.password_hash) {
                    debug!("User {} logged in", user.id);
                    self.generate_token(&user)
                } else {
                    Err(AuthServiceError::InvalidCredentials)
                }
            }
            Err(UserServiceError::UserNotFound) => Err(AuthServiceError::InvalidCredentials),
            Err(err) => Err(AuthServiceError::UserServiceError(err)),
        }
    }

    fn generate_token(&self, user: &User) -> Result<LoginResponse, AuthServiceError> {
        let now = Utc::now();
        let expires_in = TOKEN_TTL_HOURS * 60 * 60;
        let exp = (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
        let iat = now.timestamp() as usize;

        let claims = TokenClaims {
            sub: user.id.clone(),
            exp,
            iat,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .map_err(|e| AuthServiceError::JwtError(format!("{:#?}", e)))?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            user: user.profile(),
        })
    }

    fn verify_token(&self, token: &str) -> Result<TokenClaims, AuthServiceError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_ref());
        let validation = Validation::default();

        match decode::<TokenClaims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                let now = Utc::now().timestamp() as usize;
                if token_data.claims.exp < now {
                    Err(AuthServiceError::ExpiredToken)
                } else {
                    Ok(token_data.claims)
                }
            }
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Err(AuthServiceError::ExpiredToken)
                }
                _ => Err(AuthServiceError::InvalidToken),
            },
        }
    }

    fn extract_user_id_from_token(&self, token: &str) -> Result<String, AuthServiceError> {
        let claims = self.verify_token(token)?;
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::{InMemoryUserRepository, MockUserRepository};

    fn auth_service(secret: &str) -> AuthService {
        AuthService::with_jwt_secret(
            Arc::new(UserService::new(Arc::new(InMemoryUserRepository::new()))),
            secret.to_string(),
        )
    }

    #[test]
    fn test_password_hash_is_salted() {
        let first = hash_password("hunter2");
        let second = hash_password("hunter2");

        assert_ne!(first, second);
        assert!(verify_password("hunter2", &first));
        assert!(verify_password("hunter2", &second));
        assert!(!verify_password("hunter3", &first));
        assert!(!first.contains("hunter2"));
    }

    #[test]
    fn test_verify_password_rejects_malformed_hash() {
        assert!(!verify_password("hunter2", "no-separator"));
        assert!(!verify_password("hunter2", ""));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = auth_service("test-secret-key");

        let registered = service.register("alice", "hunter2").await.unwrap();
        let logged_in = service.authenticate_user("alice", "hunter2").await.unwrap();

        assert_eq!(registered.user.username, "alice");
        assert_eq!(registered.user.rating, 1000);
        assert_eq!(logged_in.user.id, registered.user.id);
        assert_eq!(
            service.extract_user_id_from_token(&logged_in.token).unwrap(),
            registered.user.id
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let service = auth_service("test-secret-key");
        service.register("alice", "hunter2").await.unwrap();

        let result = service.register("alice", "other").await;

        assert!(matches!(result, Err(AuthServiceError::UsernameTaken)));
    }

    #[tokio::test]
    async fn test_register_requires_both_fields() {
        let service = auth_service("test-secret-key");

        assert!(matches!(
            service.register("", "hunter2").await,
            Err(AuthServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.register("alice", "").await,
            Err(AuthServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_user() {
        let service = auth_service("test-secret-key");
        service.register("alice", "hunter2").await.unwrap();

        assert!(matches!(
            service.authenticate_user("alice", "wrong").await,
            Err(AuthServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            service.authenticate_user("nobody", "hunter2").await,
            Err(AuthServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_surfaces_storage_failure() {
        let mut repository = MockUserRepository::new();
        repository.expect_get_user_by_username().returning(|_| {
            Err(crate::repositories::errors::user_repository_errors::UserRepositoryError::DynamoDb(
                "unavailable".to_string(),
            ))
        });
        let service = AuthService::with_jwt_secret(
            Arc::new(UserService::new(Arc::new(repository))),
            "test-secret-key".to_string(),
        );

        let result = service.authenticate_user("alice", "hunter2").await;

        assert!(matches!(result, Err(AuthServiceError::UserServiceError(_))));
    }

    #[test]
    fn test_token_generation_and_verification_roundtrip() {
        let service = auth_service("test-secret-key");
        let user = User::new("roundtrip".to_string(), hash_password("pw"));

        let login_response = service.generate_token(&user).unwrap();

        assert_eq!(login_response.token_type, "Bearer");
        assert_eq!(login_response.expires_in, 24 * 60 * 60);
        let claims = service.verify_token(&login_response.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_token_invalid() {
        let service = auth_service("test-secret-key");

        let result = service.verify_token("invalid-token");

        assert!(matches!(result, Err(AuthServiceError::InvalidToken)));
    }

    #[test]
    fn test_different_secrets_produce_different_tokens() {
        let first = auth_service("secret1");
        let second = auth_service("secret2");
        let user = User::new("same".to_string(), hash_password("pw"));

        let token1 = first.generate_token(&user).unwrap().token;
        let token2 = second.generate_token(&user).unwrap().token;

        assert_ne!(token1, token2);
        assert!(first.verify_token(&token1).is_ok());
        assert!(second.verify_token(&token1).is_err());
        assert!(second.verify_token(&token2).is_ok());
        assert!(first.verify_token(&token2).is_err());
    }
}
