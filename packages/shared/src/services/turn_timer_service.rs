use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Delivered when a turn clock runs out. `turn_started_at` identifies the turn
/// the timer was armed for so a late expiry can be recognised as stale.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnExpired {
    pub room_code: String,
    pub turn_started_at: DateTime<Utc>,
}

/// One cancellable countdown per playing room.
pub struct TurnTimerService {
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
    expired_tx: UnboundedSender<TurnExpired>,
}

impl TurnTimerService {
    pub fn new() -> (Self, UnboundedReceiver<TurnExpired>) {
        let (expired_tx, expired_rx) = unbounded_channel();
        (
            TurnTimerService {
                timers: Mutex::new(HashMap::new()),
                expired_tx,
            },
            expired_rx,
        )
    }

    /// Time left on a turn that started at `turn_started_at`, never negative.
    pub fn remaining(
        turn_started_at: DateTime<Utc>,
        turn_seconds: u64,
        now: DateTime<Utc>,
    ) -> Duration {
        let elapsed = (now - turn_started_at).to_std().unwrap_or(Duration::ZERO);
        Duration::from_secs(turn_seconds).saturating_sub(elapsed)
    }

    /// Arms the room's timer, replacing any previous one.
    pub fn start(&self, room_code: &str, turn_started_at: DateTime<Utc>, turn_seconds: u64) {
        let remaining = Self::remaining(turn_started_at, turn_seconds, Utc::now());
        let expired_tx = self.expired_tx.clone();
        let code = room_code.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            debug!("Turn timer expired for room {}", code);
            if expired_tx
                .send(TurnExpired {
                    room_code: code.clone(),
                    turn_started_at,
                })
                .is_err()
            {
                warn!("Turn expiry for room {} dropped, no listener", code);
            }
        });

        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = timers.insert(room_code.to_string(), handle) {
            previous.abort();
        }
        debug!("Armed turn timer for room {} ({:?})", room_code, remaining);
    }

    pub fn clear(&self, room_code: &str) {
        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = timers.remove(room_code) {
            handle.abort();
            debug!("Cleared turn timer for room {}", room_code);
        }
    }

    pub fn is_armed(&self, room_code: &str) -> bool {
        self.timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(room_code)
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TurnTimerService {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().unwrap_or_else(|e| e.into_inner());
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }
}
