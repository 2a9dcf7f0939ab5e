use tracing::{debug, error};

use crate::state::AppState;
use shared::models::events::ServerEvent;
use shared::services::errors::chat_service_errors::ChatServiceError;

async fn reply_chat_error(state: &AppState, connection_id: &str, err: &ChatServiceError) {
    match err {
        ChatServiceError::RepositoryError(_) => {
            error!("Failed chat action for {}: {}", connection_id, err)
        }
        _ => debug!("Rejected chat action from {}: {}", connection_id, err),
    }
    state
        .websocket_service
        .notify(connection_id, &ServerEvent::match_error(err.user_message()))
        .await;
}

pub async fn handle_send_chat(
    state: &AppState,
    connection_id: &str,
    user_id: &str,
    code: &str,
    text: &str,
) {
    match state.chat_service.send(code, user_id, text).await {
        Ok(message) => {
            state
                .websocket_service
                .broadcast(code, &ServerEvent::ChatMessage { message })
                .await;
        }
        Err(e) => reply_chat_error(state, connection_id, &e).await,
    }
}

pub async fn handle_fetch_history(
    state: &AppState,
    connection_id: &str,
    code: &str,
    limit: Option<usize>,
) {
    match state.chat_service.history(code, limit).await {
        Ok(messages) => {
            state
                .websocket_service
                .notify(
                    connection_id,
                    &ServerEvent::ChatHistory {
                        room_code: code.to_string(),
                        messages,
                    },
                )
                .await;
        }
        Err(e) => reply_chat_error(state, connection_id, &e).await,
    }
}
