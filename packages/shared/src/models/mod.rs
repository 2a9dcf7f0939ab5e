pub mod auth;
pub mod chat;
pub mod events;
pub mod game_match;
pub mod game_move;
pub mod matchmaking;
pub mod room;
pub mod user;
