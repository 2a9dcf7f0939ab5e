use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use game_server::config::{ServerConfig, StorageBackend};
use game_server::state::AppState;
use game_server::{build_app, timeouts};
use shared::repositories::match_repository::DynamoDbMatchRepository;
use shared::repositories::user_repository::DynamoDbUserRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let (state, expired) = match &config.storage {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            AppState::in_memory(config.jwt_secret.clone(), config.settings)
        }
        StorageBackend::DynamoDb {
            users_table,
            matches_table,
        } => {
            info!(
                "Using DynamoDB tables {} and {}",
                users_table, matches_table
            );
            let aws_config = aws_config::load_from_env().await;
            let client = aws_sdk_dynamodb::Client::new(&aws_config);
            AppState::new(
                config.jwt_secret.clone(),
                config.settings,
                Arc::new(DynamoDbUserRepository::new(client.clone(), users_table.clone())),
                Arc::new(DynamoDbMatchRepository::new(client, matches_table.clone())),
            )
        }
    };

    timeouts::spawn_timeout_pump(state.clone(), expired);
    let app = build_app(state, config.client_origin.as_deref());

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        "Game server listening on {} (board {}x{}, {} in a row, {}s turns)",
        listener.local_addr()?,
        config.settings.board_size,
        config.settings.board_size,
        config.settings.win_length,
        config.settings.turn_seconds
    );
    axum::serve(listener, app).await?;
    Ok(())
}
