use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use game_server::build_app;
use game_server::state::AppState;
use game_server::timeouts::spawn_timeout_pump;
use shared::services::room_service::GameSettings;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn start_server(settings: GameSettings) -> SocketAddr {
    let (state, expired) = AppState::in_memory("e2e-secret".to_string(), settings);
    spawn_timeout_pump(state.clone(), expired);
    let app = build_app(state, None);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });
    addr
}

/// Registers a user and returns (user_id, token).
async fn register(addr: SocketAddr, username: &str) -> (String, String) {
    let response = reqwest::Client::new()
        .post(format!("http://{}/auth/register", addr))
        .json(&json!({ "username": username, "password": "hunter22" }))
        .send()
        .await
        .expect("Register request failed");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Invalid register body");
    (
        body["user"]["id"].as_str().expect("Missing user id").to_string(),
        body["token"].as_str().expect("Missing token").to_string(),
    )
}

async fn connect(addr: SocketAddr, token: &str) -> Socket {
    let (socket, _) = connect_async(format!("ws://{}/ws?token={}", addr, token))
        .await
        .expect("Failed to connect to WebSocket");
    socket
}

async fn send(socket: &mut Socket, message: Value) {
    socket
        .send(Message::Text(message.to_string()))
        .await
        .expect("Failed to send message");
}

/// Reads frames until an event with the given name arrives.
async fn expect_event(socket: &mut Socket, name: &str) -> Value {
    timeout(WAIT, async {
        loop {
            let frame = socket
                .next()
                .await
                .unwrap_or_else(|| panic!("Connection closed waiting for {}", name))
                .expect("WebSocket error");
            if let Message::Text(text) = frame {
                let event: Value = serde_json::from_str(&text).expect("Invalid JSON event");
                if event["event"] == name {
                    return event;
                }
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("Timed out waiting for {}", name))
}

/// Two registered players seated in a started room: (code, alice socket, bob socket, alice id, bob id).
async fn started_room(addr: SocketAddr) -> (String, Socket, Socket, String, String) {
    let (alice_id, alice_token) = register(addr, "alice").await;
    let (bob_id, bob_token) = register(addr, "bob").await;
    let mut alice = connect(addr, &alice_token).await;
    let mut bob = connect(addr, &bob_token).await;

    send(&mut alice, json!({ "action": "create_room" })).await;
    let created = expect_event(&mut alice, "room_created").await;
    let code = created["room_code"].as_str().unwrap().to_string();

    send(&mut bob, json!({ "action": "join_room", "room_code": code })).await;
    let joined = expect_event(&mut bob, "room_joined").await;
    assert_eq!(joined["self_id"], bob_id.as_str());
    expect_event(&mut alice, "room_updated").await;

    send(&mut alice, json!({ "action": "toggle_ready", "room_code": code, "ready": true })).await;
    send(&mut bob, json!({ "action": "toggle_ready", "room_code": code, "ready": true })).await;
    let started = expect_event(&mut alice, "match_started").await;
    assert_eq!(started["room"]["status"], "playing");
    expect_event(&mut bob, "match_started").await;

    (code, alice, bob, alice_id, bob_id)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_game_over_websocket() {
    let addr = start_server(GameSettings::default()).await;
    let (code, mut alice, mut bob, alice_id, bob_id) = started_room(addr).await;

    for i in 0..4 {
        send(&mut alice, json!({ "action": "submit_move", "room_code": code, "x": i, "y": 0 })).await;
        expect_event(&mut bob, "move_accepted").await;
        send(&mut bob, json!({ "action": "submit_move", "room_code": code, "x": i, "y": 1 })).await;
        expect_event(&mut alice, "move_accepted").await;
    }

    // Out of turn: rejected for the caller only.
    send(&mut bob, json!({ "action": "submit_move", "room_code": code, "x": 9, "y": 9 })).await;
    let rejected = expect_event(&mut bob, "match_error").await;
    assert_eq!(rejected["message"], "Not your turn");

    send(&mut alice, json!({ "action": "submit_move", "room_code": code, "x": 4, "y": 0 })).await;
    let ended = expect_event(&mut bob, "match_ended").await;
    assert_eq!(ended["outcome"], "X");
    assert_eq!(ended["reason"], "normal");
    assert_eq!(ended["winning_line"].as_array().unwrap().len(), 5);
    assert_eq!(ended["rating_deltas"]["x"]["user_id"], alice_id.as_str());
    assert_eq!(ended["rating_deltas"]["x"]["delta"], 16);
    assert_eq!(ended["rating_deltas"]["o"]["user_id"], bob_id.as_str());
    assert_eq!(ended["rating_deltas"]["o"]["delta"], -16);
    assert_eq!(ended["room"]["status"], "finished");

    let client = reqwest::Client::new();
    let leaderboard: Value = client
        .get(format!("http://{}/users/leaderboard?limit=2", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(leaderboard[0]["username"], "alice");
    assert_eq!(leaderboard[0]["rating"], 1016);
    assert_eq!(leaderboard[1]["rating"], 984);

    let login: Value = client
        .post(format!("http://{}/auth/login", addr))
        .json(&json!({ "username": "alice", "password": "hunter22" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let alice_token = login["token"].as_str().unwrap().to_string();
    let history: Value = client
        .get(format!("http://{}/matches/history", addr))
        .bearer_auth(&alice_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["room_code"], code.as_str());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_turn_timeout_ends_game() {
    let addr = start_server(GameSettings {
        turn_seconds: 1,
        ..GameSettings::default()
    })
    .await;
    let (_code, mut alice, mut bob, _, bob_id) = started_room(addr).await;

    let ended = expect_event(&mut alice, "match_ended").await;
    assert_eq!(ended["reason"], "timeout");
    assert_eq!(ended["outcome"], "O");
    assert_eq!(ended["rating_deltas"]["o"]["user_id"], bob_id.as_str());
    assert_eq!(ended["room"]["status"], "finished");
    let players = ended["room"]["players"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    assert!(players.iter().all(|p| p["is_ready"] == false));
    expect_event(&mut bob, "match_ended").await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_matchmaking_and_chat() {
    let addr = start_server(GameSettings::default()).await;
    let (_, alice_token) = register(addr, "alice").await;
    let (_, bob_token) = register(addr, "bob").await;
    let mut alice = connect(addr, &alice_token).await;
    let mut bob = connect(addr, &bob_token).await;

    send(&mut alice, json!({ "action": "find_match" })).await;
    expect_event(&mut alice, "matchmaking_waiting").await;
    send(&mut bob, json!({ "action": "find_match" })).await;

    let matched = expect_event(&mut bob, "matchmaking_matched").await;
    let code = matched["room_code"].as_str().unwrap().to_string();
    let started = expect_event(&mut alice, "match_started").await;
    assert_eq!(started["room"]["code"], code.as_str());

    send(&mut bob, json!({ "action": "send_chat", "room_code": code, "text": "  gl hf " })).await;
    let chat = expect_event(&mut alice, "chat_message").await;
    assert_eq!(chat["message"]["text"], "gl hf");
    assert_eq!(chat["message"]["username"], "bob");

    send(&mut alice, json!({ "action": "fetch_chat_history", "room_code": code })).await;
    let history = expect_event(&mut alice, "chat_history").await;
    assert_eq!(history["messages"].as_array().unwrap().len(), 1);

    send(&mut alice, json!({ "action": "ping" })).await;
    expect_event(&mut alice, "pong").await;
}

#[tokio::test]
async fn test_handshake_without_token_is_rejected() {
    let addr = start_server(GameSettings::default()).await;

    let without = connect_async(format!("ws://{}/ws", addr)).await;
    let forged = connect_async(format!("ws://{}/ws?token=not-a-jwt", addr)).await;

    assert!(without.is_err());
    assert!(forged.is_err());
}

#[tokio::test]
async fn test_http_surface() {
    let addr = start_server(GameSettings::default()).await;
    let client = reqwest::Client::new();

    let health = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), 200);
    assert_eq!(health.text().await.unwrap(), "Healthy!");

    let (user_id, token) = register(addr, "carol").await;
    let duplicate = client
        .post(format!("http://{}/auth/register", addr))
        .json(&json!({ "username": "carol", "password": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), 409);

    let missing = client
        .post(format!("http://{}/auth/register", addr))
        .json(&json!({ "username": "dave" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 400);

    let bad_login = client
        .post(format!("http://{}/auth/login", addr))
        .json(&json!({ "username": "carol", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_login.status(), 401);

    let me: Value = client
        .get(format!("http://{}/users/me", addr))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["id"], user_id.as_str());
    assert_eq!(me["username"], "carol");

    let anonymous = client
        .get(format!("http://{}/users/me", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), 401);
}
