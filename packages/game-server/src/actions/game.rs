use tracing::info;

use super::reply_room_error;
use crate::state::AppState;
use shared::models::events::ServerEvent;
use shared::services::room_service::{MatchSummary, MoveOutcome};

pub fn match_ended(summary: MatchSummary) -> ServerEvent {
    ServerEvent::MatchEnded {
        room: summary.room,
        outcome: summary.outcome,
        winning_line: summary.winning_line,
        last_move: summary.last_move,
        reason: summary.reason,
        rating_deltas: summary.rating_deltas,
    }
}

pub async fn handle_submit_move(
    state: &AppState,
    connection_id: &str,
    user_id: &str,
    code: &str,
    x: i64,
    y: i64,
) {
    match state.room_service.submit_move(code, user_id, x, y).await {
        Ok(MoveOutcome::Continued { room, last_move }) => {
            state
                .websocket_service
                .broadcast(code, &ServerEvent::MoveAccepted { room, last_move })
                .await;
        }
        Ok(MoveOutcome::Finished(summary)) => {
            info!("Room {} finished with {:?}", code, summary.outcome);
            state
                .websocket_service
                .broadcast(code, &match_ended(summary))
                .await;
        }
        Err(e) => reply_room_error(state, connection_id, "submit move", &e).await,
    }
}

pub async fn handle_fetch_moves(state: &AppState, connection_id: &str, code: &str) {
    match state.room_service.list_moves(code).await {
        Ok(moves) => {
            state
                .websocket_service
                .notify(
                    connection_id,
                    &ServerEvent::MoveLog {
                        room_code: code.to_string(),
                        moves,
                    },
                )
                .await;
        }
        Err(e) => reply_room_error(state, connection_id, "fetch moves", &e).await,
    }
}
