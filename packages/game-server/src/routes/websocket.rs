use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::actions::{connect::handle_connect, disconnect::handle_disconnect, handle_message};
use crate::{error::ApiError, state::AppState};
use shared::models::events::ServerEvent;

pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = state
        .websocket_auth
        .authenticate_connection(query.token.as_deref(), &headers)
        .await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(state, user_id, socket)))
}

async fn handle_socket(state: AppState, user_id: String, socket: WebSocket) {
    let connection_id = Uuid::new_v4().to_string();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (sv_tx, mut sv_rx) = mpsc::unbounded_channel::<ServerEvent>();

    handle_connect(&state, &connection_id, &user_id, sv_tx).await;

    let writer_connection = connection_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(event) = sv_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize event for {}: {}", writer_connection, e);
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => {
                handle_message(&state, &connection_id, &user_id, text.as_str()).await;
            }
            Message::Close(_) => {
                debug!("Connection {} sent close", connection_id);
                break;
            }
            _ => {}
        }
    }

    handle_disconnect(&state, &connection_id).await;
    writer.abort();
    info!("Connection {} for user {} closed", connection_id, user_id);
}
