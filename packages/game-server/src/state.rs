use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use shared::repositories::chat_repository::InMemoryChatRepository;
use shared::repositories::match_repository::{InMemoryMatchRepository, MatchRepository};
use shared::repositories::move_repository::InMemoryMoveRepository;
use shared::repositories::room_repository::InMemoryRoomRepository;
use shared::repositories::user_repository::{InMemoryUserRepository, UserRepository};
use shared::repositories::websocket_repository::InMemoryWebSocketRepository;
use shared::services::auth_service::AuthService;
use shared::services::chat_service::ChatService;
use shared::services::match_service::MatchService;
use shared::services::matchmaking_service::MatchmakingService;
use shared::services::room_service::{GameSettings, GameStores, RoomService};
use shared::services::turn_timer_service::{TurnExpired, TurnTimerService};
use shared::services::user_service::UserService;
use shared::services::websocket_service::WebSocketService;

use crate::auth::WebSocketAuth;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub match_service: Arc<MatchService>,
    pub room_service: Arc<RoomService>,
    pub matchmaking_service: Arc<MatchmakingService>,
    pub chat_service: Arc<ChatService>,
    pub websocket_service: Arc<WebSocketService>,
    pub websocket_auth: WebSocketAuth,
}

impl AppState {
    /// Wires every service. Rooms, moves and chat always live in this process;
    /// users and matches come from the given stores. The receiver carries turn
    /// expiries and must be handed to the timeout pump.
    pub fn new(
        jwt_secret: String,
        settings: GameSettings,
        users: Arc<dyn UserRepository + Send + Sync>,
        matches: Arc<dyn MatchRepository + Send + Sync>,
    ) -> (Self, UnboundedReceiver<TurnExpired>) {
        let stores = GameStores {
            rooms: Arc::new(InMemoryRoomRepository::new()),
            moves: Arc::new(InMemoryMoveRepository::new()),
            matches: matches.clone(),
            users: users.clone(),
            chat: Arc::new(InMemoryChatRepository::new()),
        };

        let (timers, expired) = TurnTimerService::new();
        let room_service = Arc::new(RoomService::new(
            stores.clone(),
            Arc::new(timers),
            settings,
        ));

        let user_service = Arc::new(UserService::new(users));
        let auth_service = Arc::new(AuthService::with_jwt_secret(
            user_service.clone(),
            jwt_secret,
        ));

        let state = AppState {
            websocket_auth: WebSocketAuth::new(auth_service.clone(), user_service.clone()),
            auth_service,
            user_service,
            match_service: Arc::new(MatchService::new(matches)),
            matchmaking_service: Arc::new(MatchmakingService::new(room_service.clone())),
            chat_service: Arc::new(ChatService::new(
                stores.chat.clone(),
                stores.users.clone(),
                room_service.clone(),
            )),
            room_service,
            websocket_service: Arc::new(WebSocketService::new(Arc::new(
                InMemoryWebSocketRepository::new(),
            ))),
        };
        (state, expired)
    }

    pub fn in_memory(
        jwt_secret: String,
        settings: GameSettings,
    ) -> (Self, UnboundedReceiver<TurnExpired>) {
        Self::new(
            jwt_secret,
            settings,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryMatchRepository::new()),
        )
    }
}
