pub mod auth_service;
pub mod chat_service;
pub mod errors;
pub mod match_service;
pub mod matchmaking_service;
pub mod rating_service;
pub mod room_code_service;
pub mod room_service;
pub mod rules_service;
pub mod turn_timer_service;
pub mod user_service;
pub mod websocket_service;
