use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};
use tokio::sync::RwLock;

use crate::models::game_match::GameMatch;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn create_match(&self, game_match: &GameMatch) -> Result<(), GameRepositoryError>;
    /// Newest first.
    async fn list_matches_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<GameMatch>, GameRepositoryError>;
}

#[derive(Default)]
pub struct InMemoryMatchRepository {
    matches: RwLock<Vec<GameMatch>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn create_match(&self, game_match: &GameMatch) -> Result<(), GameRepositoryError> {
        let mut matches = self.matches.write().await;
        if matches.iter().any(|m| m.id == game_match.id) {
            return Err(GameRepositoryError::AlreadyExists(format!(
                "Match {}",
                game_match.id
            )));
        }
        matches.push(game_match.clone());
        Ok(())
    }

    async fn list_matches_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<GameMatch>, GameRepositoryError> {
        let mut found: Vec<GameMatch> = self
            .matches
            .read()
            .await
            .iter()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.ended_at.cmp(&a.ended_at));
        found.truncate(limit);
        Ok(found)
    }
}

pub struct DynamoDbMatchRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbMatchRepository {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl MatchRepository for DynamoDbMatchRepository {
    async fn create_match(&self, game_match: &GameMatch) -> Result<(), GameRepositoryError> {
        let item =
            to_item(game_match).map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("ConditionalCheckFailedException") {
                    Err(GameRepositoryError::AlreadyExists(format!(
                        "Match {}",
                        game_match.id
                    )))
                } else {
                    Err(GameRepositoryError::DynamoDb(error_str))
                }
            }
        }
    }

    async fn list_matches_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<GameMatch>, GameRepositoryError> {
        let mut matches = Vec::new();
        let mut start_key = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression("contains(player_ids, :user_id)")
                .expression_attribute_values(":user_id", AttributeValue::S(user_id.to_string()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

            for item in output.items.unwrap_or_default() {
                let game_match: GameMatch = from_item(item)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                matches.push(game_match);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        matches.sort_by(|a, b| b.ended_at.cmp(&a.ended_at));
        matches.truncate(limit);
        Ok(matches)
    }
}
