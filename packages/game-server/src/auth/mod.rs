use axum::http::HeaderMap;
use shared::services::auth_service::{AuthService, AuthServiceTrait};
use shared::services::user_service::UserService;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;

#[derive(Clone)]
pub struct WebSocketAuth {
    auth_service: Arc<AuthService>,
    user_service: Arc<UserService>,
}

/// Reads the token from `?token=` first, then from an `Authorization: Bearer` header.
pub fn bearer_token<'a>(query_token: Option<&'a str>, headers: &'a HeaderMap) -> Option<&'a str> {
    query_token.filter(|t| !t.is_empty()).or_else(|| {
        headers
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
    })
}

impl WebSocketAuth {
    pub fn new(auth_service: Arc<AuthService>, user_service: Arc<UserService>) -> Self {
        Self {
            auth_service,
            user_service,
        }
    }

    /// Authenticates a websocket handshake and returns the user id.
    /// The token must verify and name a user that still exists.
    pub async fn authenticate_connection(
        &self,
        query_token: Option<&str>,
        headers: &HeaderMap,
    ) -> Result<String, ApiError> {
        let token = bearer_token(query_token, headers).ok_or(ApiError::Unauthorized)?;

        let user_id = self
            .auth_service
            .extract_user_id_from_token(token)
            .map_err(|e| {
                debug!("Rejected websocket token: {}", e);
                ApiError::Unauthorized
            })?;

        self.user_service.get_user_by_id(&user_id).await.map_err(|e| {
            debug!("Rejected websocket user {}: {}", user_id, e);
            ApiError::Unauthorized
        })?;

        Ok(user_id)
    }
}
