use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{debug, error};

use crate::{error::ApiError, state::AppState};
use shared::models::auth::requests::{LoginRequest, RegisterRequest};
use shared::models::auth::responses::LoginResponse;
use shared::services::auth_service::AuthServiceTrait;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    debug!("Rejected auth request body: {}", rejection);
    ApiError::BadRequest("Username and password are required".to_string())
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let Json(request) = payload.map_err(bad_body)?;
    let response = state
        .auth_service
        .register(&request.username, &request.password)
        .await
        .map_err(|e| {
            error!("Failed to register user {}: {}", request.username, e);
            ApiError::from(e)
        })?;
    debug!("User registered successfully: {}", response.user.id);
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload.map_err(bad_body)?;
    state
        .auth_service
        .authenticate_user(&request.username, &request.password)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to authenticate user {}: {}", request.username, e);
            ApiError::from(e)
        })
}
