use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{auth::bearer_token, error::ApiError, state::AppState};
use shared::services::auth_service::AuthServiceTrait;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(None, &parts.headers).ok_or(ApiError::Unauthorized)?;

        let user_id = state
            .auth_service
            .extract_user_id_from_token(token)
            .map_err(ApiError::from)?;

        Ok(AuthenticatedUser { user_id })
    }
}
