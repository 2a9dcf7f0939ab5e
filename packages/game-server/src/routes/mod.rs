pub mod auth;
pub mod health;
pub mod matches;
pub mod user;
pub mod websocket;
