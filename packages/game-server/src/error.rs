use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::services::errors::{
    auth_service_errors::AuthServiceError, match_service_errors::MatchServiceError,
    room_service_errors::OPERATION_FAILED, user_service_errors::UserServiceError,
};

#[derive(Debug)]
pub enum ApiError {
    UserService(UserServiceError),
    AuthService(AuthServiceError),
    MatchService(MatchServiceError),
    BadRequest(String),
    Unauthorized,
}

impl From<UserServiceError> for ApiError {
    fn from(error: UserServiceError) -> Self {
        ApiError::UserService(error)
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(error: AuthServiceError) -> Self {
        ApiError::AuthService(error)
    }
}

impl From<MatchServiceError> for ApiError {
    fn from(error: MatchServiceError) -> Self {
        ApiError::MatchService(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UserService(UserServiceError::UserAlreadyExists) => StatusCode::CONFLICT,
            ApiError::UserService(UserServiceError::UserNotFound) => StatusCode::NOT_FOUND,
            ApiError::UserService(UserServiceError::ValidationError(_)) => StatusCode::BAD_REQUEST,
            ApiError::UserService(UserServiceError::RepositoryError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            ApiError::AuthService(AuthServiceError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::AuthService(AuthServiceError::UsernameTaken) => StatusCode::CONFLICT,
            ApiError::AuthService(AuthServiceError::ValidationError(_)) => StatusCode::BAD_REQUEST,
            ApiError::AuthService(AuthServiceError::UserServiceError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::AuthService(AuthServiceError::JwtError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::AuthService(
                AuthServiceError::InvalidToken | AuthServiceError::ExpiredToken,
            ) => StatusCode::UNAUTHORIZED,

            ApiError::MatchService(MatchServiceError::RepositoryError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::UserService(err) if self.status().is_client_error() => err.to_string(),
            ApiError::AuthService(err) if self.status().is_client_error() => err.to_string(),
            _ => OPERATION_FAILED.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
