use tracing::debug;

use crate::state::AppState;

/// Drops the ticket and every subscription. Seats are kept so the player can
/// come back with `join_room` or `sync_room`.
pub async fn handle_disconnect(state: &AppState, connection_id: &str) {
    state.matchmaking_service.cancel(connection_id).await;
    let rooms = state.websocket_service.remove_connection(connection_id).await;
    debug!(
        "Connection {} left {} room subscription(s)",
        connection_id,
        rooms.len()
    );
}
