use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::error;

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};
use shared::models::user::UserProfile;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me))
        .route("/users/leaderboard", get(leaderboard))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

async fn get_me(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<UserProfile>, ApiError> {
    state
        .user_service
        .get_profile(&authenticated_user.user_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!(
                "Failed to retrieve user {}: {}",
                authenticated_user.user_id, e
            );
            ApiError::from(e)
        })
}

async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    state
        .user_service
        .leaderboard(query.limit)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to load leaderboard: {}", e);
            ApiError::from(e)
        })
}
