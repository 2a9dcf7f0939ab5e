use tracing::info;

use super::reply_room_error;
use crate::state::AppState;
use shared::models::events::ServerEvent;
use shared::services::room_service::LeaveOutcome;

pub const HOST_LEFT: &str = "host_left";

pub async fn handle_create_room(state: &AppState, connection_id: &str, user_id: &str) {
    match state.room_service.create_room(user_id).await {
        Ok(room) => {
            state.websocket_service.subscribe(&room.code, connection_id).await;
            state
                .websocket_service
                .notify(
                    connection_id,
                    &ServerEvent::RoomCreated {
                        room_code: room.code.clone(),
                        room,
                    },
                )
                .await;
        }
        Err(e) => reply_room_error(state, connection_id, "create room", &e).await,
    }
}

pub async fn handle_join_room(state: &AppState, connection_id: &str, user_id: &str, code: &str) {
    match state.room_service.join_room(code, user_id).await {
        Ok(room) => {
            state.websocket_service.subscribe(code, connection_id).await;
            state
                .websocket_service
                .notify(
                    connection_id,
                    &ServerEvent::RoomJoined {
                        room_code: code.to_string(),
                        room: room.clone(),
                        self_id: user_id.to_string(),
                    },
                )
                .await;
            state
                .websocket_service
                .broadcast(code, &ServerEvent::RoomUpdated { room })
                .await;
        }
        Err(e) => reply_room_error(state, connection_id, "join room", &e).await,
    }
}

/// Resubscribes and returns the current state. Seats are not required.
pub async fn handle_sync_room(state: &AppState, connection_id: &str, code: &str) {
    match state.room_service.sync_room(code).await {
        Ok(room) => {
            state.websocket_service.subscribe(code, connection_id).await;
            state
                .websocket_service
                .notify(connection_id, &ServerEvent::RoomUpdated { room })
                .await;
        }
        Err(e) => reply_room_error(state, connection_id, "sync room", &e).await,
    }
}

pub async fn handle_toggle_ready(
    state: &AppState,
    connection_id: &str,
    user_id: &str,
    code: &str,
    ready: bool,
) {
    match state.room_service.set_ready(code, user_id, ready).await {
        Ok(outcome) => {
            let event = if outcome.started {
                ServerEvent::MatchStarted { room: outcome.room }
            } else {
                ServerEvent::RoomUpdated { room: outcome.room }
            };
            state.websocket_service.broadcast(code, &event).await;
        }
        Err(e) => reply_room_error(state, connection_id, "toggle ready", &e).await,
    }
}

pub async fn handle_start(state: &AppState, connection_id: &str, user_id: &str, code: &str) {
    match state.room_service.start_game(code, user_id).await {
        Ok(room) => {
            state
                .websocket_service
                .broadcast(code, &ServerEvent::MatchStarted { room })
                .await;
        }
        Err(e) => reply_room_error(state, connection_id, "start game", &e).await,
    }
}

pub async fn handle_leave(state: &AppState, connection_id: &str, user_id: &str, code: &str) {
    match state.room_service.leave_room(code, user_id).await {
        Ok(LeaveOutcome::Closed) => {
            info!("Room {} closed by its host", code);
            state
                .websocket_service
                .broadcast(
                    code,
                    &ServerEvent::RoomClosed {
                        room_code: code.to_string(),
                        reason: HOST_LEFT.to_string(),
                    },
                )
                .await;
            state.websocket_service.clear_room(code).await;
        }
        Ok(LeaveOutcome::Left(room)) => {
            state.websocket_service.unsubscribe(code, connection_id).await;
            state
                .websocket_service
                .broadcast(code, &ServerEvent::RoomUpdated { room })
                .await;
        }
        Ok(LeaveOutcome::NotSeated) => {
            state.websocket_service.unsubscribe(code, connection_id).await;
        }
        Err(e) => reply_room_error(state, connection_id, "leave room", &e).await,
    }
}
