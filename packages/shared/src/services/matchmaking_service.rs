use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::models::events::RoomView;
use crate::models::matchmaking::Ticket;
use crate::services::errors::matchmaking_service_errors::MatchmakingServiceError;
use crate::services::room_service::RoomService;

/// Strict FIFO of waiting seekers, at most one ticket per user.
#[derive(Debug, Default)]
pub struct MatchmakingQueue {
    tickets: VecDeque<Ticket>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pairing {
    Waiting,
    Matched { host: Ticket, guest: Ticket },
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.tickets.iter().any(|t| t.user_id == user_id)
    }

    pub fn enqueue(&mut self, ticket: Ticket) -> Result<(), MatchmakingServiceError> {
        if self.contains_user(&ticket.user_id) {
            return Err(MatchmakingServiceError::AlreadyQueued);
        }
        self.tickets.push_back(ticket);
        Ok(())
    }

    pub fn dequeue_oldest(&mut self) -> Option<Ticket> {
        self.tickets.pop_front()
    }

    /// Puts a ticket back at the head, keeping its place in line.
    pub fn restore_front(&mut self, ticket: Ticket) {
        if !self.contains_user(&ticket.user_id) {
            self.tickets.push_front(ticket);
        }
    }

    pub fn cancel_by_connection(&mut self, connection_id: &str) -> bool {
        let before = self.tickets.len();
        self.tickets.retain(|t| t.connection_id != connection_id);
        before != self.tickets.len()
    }

    pub fn cancel_by_user(&mut self, user_id: &str) -> bool {
        let before = self.tickets.len();
        self.tickets.retain(|t| t.user_id != user_id);
        before != self.tickets.len()
    }

    /// Pairs the seeker with the oldest waiting ticket, or queues the seeker.
    pub fn pair_or_enqueue(&mut self, seeker: Ticket) -> Pairing {
        if self.contains_user(&seeker.user_id) {
            return Pairing::Waiting;
        }
        match self.dequeue_oldest() {
            None => {
                self.tickets.push_back(seeker);
                Pairing::Waiting
            }
            Some(oldest) if oldest.user_id == seeker.user_id => {
                // Both go back in arrival order; the one-ticket rule keeps only the first.
                let _ = self.enqueue(oldest);
                let _ = self.enqueue(seeker);
                Pairing::Waiting
            }
            Some(oldest) => Pairing::Matched {
                host: oldest,
                guest: seeker,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FindMatchResult {
    Waiting,
    Matched {
        room: RoomView,
        host: Ticket,
        guest: Ticket,
    },
}

pub struct MatchmakingService {
    queue: Mutex<MatchmakingQueue>,
    room_service: Arc<RoomService>,
}

impl MatchmakingService {
    pub fn new(room_service: Arc<RoomService>) -> Self {
        MatchmakingService {
            queue: Mutex::new(MatchmakingQueue::new()),
            room_service,
        }
    }

    /// Pairing and room creation happen under the queue lock, so a ticket is taken once.
    pub async fn find_match(
        &self,
        user_id: &str,
        connection_id: &str,
    ) -> Result<FindMatchResult, MatchmakingServiceError> {
        let mut queue = self.queue.lock().await;
        match queue.pair_or_enqueue(Ticket::new(user_id, connection_id)) {
            Pairing::Waiting => {
                debug!("User {} waiting for a match ({} queued)", user_id, queue.len());
                Ok(FindMatchResult::Waiting)
            }
            Pairing::Matched { host, guest } => {
                match self
                    .room_service
                    .create_matched_room(&host.user_id, &guest.user_id)
                    .await
                {
                    Ok(room) => {
                        info!(
                            "Matched {} with {} in room {}",
                            host.user_id, guest.user_id, room.code
                        );
                        Ok(FindMatchResult::Matched { room, host, guest })
                    }
                    Err(e) => {
                        error!(
                            "Failed to create room for {} vs {}: {}",
                            host.user_id, guest.user_id, e
                        );
                        queue.restore_front(host);
                        Err(e.into())
                    }
                }
            }
        }
    }

    pub async fn cancel(&self, connection_id: &str) -> bool {
        let removed = self.queue.lock().await.cancel_by_connection(connection_id);
        if removed {
            debug!("Removed matchmaking ticket of connection {}", connection_id);
        }
        removed
    }

    pub async fn cancel_user(&self, user_id: &str) -> bool {
        self.queue.lock().await.cancel_by_user(user_id)
    }

    pub async fn is_queued(&self, user_id: &str) -> bool {
        self.queue.lock().await.contains_user(user_id)
    }

    pub async fn queue_len(&self) -> usize {
        self.queue.lock().await.len()
    }
}
