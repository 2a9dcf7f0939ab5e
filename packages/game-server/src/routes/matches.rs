use axum::{extract::State, routing::get, Json, Router};
use tracing::error;

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};
use shared::models::game_match::GameMatch;

pub fn routes() -> Router<AppState> {
    Router::new().route("/matches/history", get(history))
}

async fn history(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<Vec<GameMatch>>, ApiError> {
    state
        .match_service
        .history(&authenticated_user.user_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!(
                "Failed to load match history for {}: {}",
                authenticated_user.user_id, e
            );
            ApiError::from(e)
        })
}
