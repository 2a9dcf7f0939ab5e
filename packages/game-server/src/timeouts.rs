use std::future::Future;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actions::game::match_ended;
use crate::state::AppState;
use shared::services::turn_timer_service::TurnExpired;

/// Consumes turn expiries, ends the game on the room and broadcasts the result.
/// Stale expiries resolve to nothing and are dropped.
pub fn spawn_timeout_pump(
    state: AppState,
    expired: UnboundedReceiver<TurnExpired>,
) -> JoinHandle<()> {
    spawn_expiry_pump(expired, move |event| {
        let state = state.clone();
        async move { handle_expiry(&state, &event).await }
    })
}

/// Runs `handler` on its own task for every event, so a room that is slow to
/// lock never holds up expiries of other rooms.
pub fn spawn_expiry_pump<T, F, Fut>(mut events: UnboundedReceiver<T>, handler: F) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            tokio::spawn(handler(event));
        }
    })
}

pub async fn handle_expiry(state: &AppState, event: &TurnExpired) {
    match state.room_service.handle_turn_timeout(event).await {
        Ok(Some(summary)) => {
            info!(
                "Room {} timed out, {:?} wins",
                event.room_code, summary.outcome
            );
            state
                .websocket_service
                .broadcast(&event.room_code, &match_ended(summary))
                .await;
        }
        Ok(None) => {}
        Err(e) => error!("Failed to time out room {}: {}", event.room_code, e),
    }
}
