pub mod chat;
pub mod connect;
pub mod default;
pub mod disconnect;
pub mod game;
pub mod matchmaking;
pub mod room;

use tracing::{debug, error};

use crate::state::AppState;
use shared::models::events::{ClientIntent, ServerEvent};
use shared::services::errors::room_service_errors::RoomServiceError;

/// Parses one inbound frame and runs the intent for this connection.
pub async fn handle_message(state: &AppState, connection_id: &str, user_id: &str, text: &str) {
    let intent = match serde_json::from_str::<ClientIntent>(text) {
        Ok(intent) => intent,
        Err(e) => return default::handle_invalid_message(state, connection_id, e).await,
    };
    debug!("Connection {} sent {:?}", connection_id, intent);

    match intent {
        ClientIntent::CreateRoom => room::handle_create_room(state, connection_id, user_id).await,
        ClientIntent::JoinRoom { room_code } => {
            room::handle_join_room(state, connection_id, user_id, &room_code).await
        }
        ClientIntent::SyncRoom { room_code } => {
            room::handle_sync_room(state, connection_id, &room_code).await
        }
        ClientIntent::ToggleReady { room_code, ready } => {
            room::handle_toggle_ready(state, connection_id, user_id, &room_code, ready).await
        }
        ClientIntent::Start { room_code } => {
            room::handle_start(state, connection_id, user_id, &room_code).await
        }
        ClientIntent::Leave { room_code } => {
            room::handle_leave(state, connection_id, user_id, &room_code).await
        }
        ClientIntent::FindMatch => {
            matchmaking::handle_find_match(state, connection_id, user_id).await
        }
        ClientIntent::CancelMatchmaking => {
            matchmaking::handle_cancel(state, connection_id).await
        }
        ClientIntent::SubmitMove { room_code, x, y } => {
            game::handle_submit_move(state, connection_id, user_id, &room_code, x, y).await
        }
        ClientIntent::FetchMoves { room_code } => {
            game::handle_fetch_moves(state, connection_id, &room_code).await
        }
        ClientIntent::SendChat { room_code, text } => {
            chat::handle_send_chat(state, connection_id, user_id, &room_code, &text).await
        }
        ClientIntent::FetchChatHistory { room_code, limit } => {
            chat::handle_fetch_history(state, connection_id, &room_code, limit).await
        }
        ClientIntent::Ping => default::handle_ping(state, connection_id).await,
    }
}

/// Sends a room failure back to the caller only.
pub(crate) async fn reply_room_error(
    state: &AppState,
    connection_id: &str,
    action: &str,
    err: &RoomServiceError,
) {
    match err {
        RoomServiceError::RepositoryError(_)
        | RoomServiceError::UserRepositoryError(_)
        | RoomServiceError::OperationFailed(_) => {
            error!("Failed to {} for {}: {}", action, connection_id, err)
        }
        _ => debug!("Rejected {} from {}: {}", action, connection_id, err),
    }
    state
        .websocket_service
        .notify(connection_id, &ServerEvent::match_error(err.user_message()))
        .await;
}
