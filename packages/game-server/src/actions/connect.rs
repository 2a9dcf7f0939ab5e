use tokio::sync::mpsc::UnboundedSender;

use crate::state::AppState;
use shared::models::events::ServerEvent;

pub async fn handle_connect(
    state: &AppState,
    connection_id: &str,
    user_id: &str,
    sender: UnboundedSender<ServerEvent>,
) {
    state
        .websocket_service
        .store_connection(connection_id, user_id, sender)
        .await;
}
