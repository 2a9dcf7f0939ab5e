pub mod auth_service_errors;
pub mod chat_service_errors;
pub mod match_service_errors;
pub mod matchmaking_service_errors;
pub mod room_service_errors;
pub mod user_service_errors;
