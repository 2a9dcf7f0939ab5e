use tracing::debug;

use crate::state::AppState;
use shared::models::events::ServerEvent;

/// Answers frames that are not a known intent.
pub async fn handle_invalid_message(state: &AppState, connection_id: &str, error: serde_json::Error) {
    debug!("Unparseable message on {}: {}", connection_id, error);
    state
        .websocket_service
        .notify(connection_id, &ServerEvent::match_error("Unknown or malformed action"))
        .await;
}

pub async fn handle_ping(state: &AppState, connection_id: &str) {
    state
        .websocket_service
        .notify(connection_id, &ServerEvent::Pong)
        .await;
}
