use tracing::error;

use crate::state::AppState;
use shared::models::events::ServerEvent;
use shared::services::matchmaking_service::FindMatchResult;

pub async fn handle_find_match(state: &AppState, connection_id: &str, user_id: &str) {
    match state.matchmaking_service.find_match(user_id, connection_id).await {
        Ok(FindMatchResult::Waiting) => {
            state
                .websocket_service
                .notify(connection_id, &ServerEvent::MatchmakingWaiting)
                .await;
        }
        Ok(FindMatchResult::Matched { room, host, guest }) => {
            for ticket in [&host, &guest] {
                state
                    .websocket_service
                    .subscribe(&room.code, &ticket.connection_id)
                    .await;
                state
                    .websocket_service
                    .notify(
                        &ticket.connection_id,
                        &ServerEvent::MatchmakingMatched {
                            room_code: room.code.clone(),
                        },
                    )
                    .await;
            }
            let code = room.code.clone();
            state
                .websocket_service
                .broadcast(&code, &ServerEvent::MatchStarted { room })
                .await;
        }
        Err(e) => {
            error!("Failed to find match for {}: {}", user_id, e);
            state
                .websocket_service
                .notify(connection_id, &ServerEvent::matchmaking_error(e.user_message()))
                .await;
        }
    }
}

/// Always acknowledged, whether or not a ticket was waiting.
pub async fn handle_cancel(state: &AppState, connection_id: &str) {
    state.matchmaking_service.cancel(connection_id).await;
    state
        .websocket_service
        .notify(connection_id, &ServerEvent::MatchmakingCanceled)
        .await;
}
