pub mod chat_repository;
pub mod errors;
pub mod match_repository;
pub mod move_repository;
pub mod room_repository;
pub mod user_repository;
pub mod websocket_repository;
