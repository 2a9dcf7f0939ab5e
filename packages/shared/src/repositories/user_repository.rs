use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, TransactWriteItem, Update};
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_item};
use tokio::sync::RwLock;

use crate::models::user::User;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;

#[cfg(test)]
use mockall::automock;

const USERNAME_INDEX: &str = "GSI_UserByUsername";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), UserRepositoryError>;
    async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserRepositoryError>;
    async fn get_user_by_username(&self, username: &str) -> Result<User, UserRepositoryError>;
    async fn username_exists(&self, username: &str) -> Result<bool, UserRepositoryError>;
    /// Adds each delta to the matching user's rating. All or nothing.
    async fn apply_rating_deltas(&self, deltas: &[(String, i32)])
        -> Result<(), UserRepositoryError>;
    async fn top_by_rating(&self, limit: usize) -> Result<Vec<User>, UserRepositoryError>;
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) || users.contains_key(&user.id) {
            return Err(UserRepositoryError::AlreadyExists);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserRepositoryError> {
        self.users
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or(UserRepositoryError::NotFound)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, UserRepositoryError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(UserRepositoryError::NotFound)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, UserRepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| u.username == username))
    }

    async fn apply_rating_deltas(
        &self,
        deltas: &[(String, i32)],
    ) -> Result<(), UserRepositoryError> {
        let mut users = self.users.write().await;
        if deltas.iter().any(|(id, _)| !users.contains_key(id)) {
            return Err(UserRepositoryError::NotFound);
        }
        for (id, delta) in deltas {
            if let Some(user) = users.get_mut(id) {
                user.rating += delta;
            }
        }
        Ok(())
    }

    async fn top_by_rating(&self, limit: usize) -> Result<Vec<User>, UserRepositoryError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        sort_leaderboard(&mut users);
        users.truncate(limit);
        Ok(users)
    }
}

/// Highest rating first; ties go to the older account.
fn sort_leaderboard(users: &mut [User]) {
    users.sort_by(|a, b| {
        b.rating
            .cmp(&a.rating)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

pub struct DynamoDbUserRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbUserRepository {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    async fn query_username(
        &self,
        username: &str,
        limit: i32,
    ) -> Result<Vec<HashMap<String, AttributeValue>>, UserRepositoryError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(USERNAME_INDEX)
            .key_condition_expression("username = :username")
            .expression_attribute_values(":username", AttributeValue::S(username.to_string()))
            .limit(limit)
            .send()
            .await;
        match result {
            Ok(output) => Ok(output.items.unwrap_or_default()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("ResourceNotFoundException")
                    || error_str.contains("ValidationException")
                {
                    return Err(UserRepositoryError::DynamoDb(format!(
                        "Username index not available. Please ensure the GSI '{}' exists and is active.",
                        USERNAME_INDEX
                    )));
                }
                Err(UserRepositoryError::DynamoDb(error_str))
            }
        }
    }
}

#[async_trait]
impl UserRepository for DynamoDbUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), UserRepositoryError> {
        let item = to_item(user).map_err(|e| UserRepositoryError::Serialization(e.to_string()))?;
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
                    Err(UserRepositoryError::AlreadyExists)
                } else {
                    Err(UserRepositoryError::DynamoDb(error_str))
                }
            }
        }
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| UserRepositoryError::DynamoDb(e.to_string()))?;
        if let Some(item) = output.item {
            let user: User =
                from_item(item).map_err(|e| UserRepositoryError::Serialization(e.to_string()))?;
            Ok(user)
        } else {
            Err(UserRepositoryError::NotFound)
        }
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, UserRepositoryError> {
        let items = self.query_username(username, 1).await?;
        match items.into_iter().next() {
            Some(item) => {
                from_item(item).map_err(|e| UserRepositoryError::Serialization(e.to_string()))
            }
            None => Err(UserRepositoryError::NotFound),
        }
    }

    async fn username_exists(&self, username: &str) -> Result<bool, UserRepositoryError> {
        Ok(!self.query_username(username, 1).await?.is_empty())
    }

    async fn apply_rating_deltas(
        &self,
        deltas: &[(String, i32)],
    ) -> Result<(), UserRepositoryError> {
        let mut transaction_items = Vec::with_capacity(deltas.len());
        for (user_id, delta) in deltas {
            transaction_items.push(
                TransactWriteItem::builder()
                    .update(
                        Update::builder()
                            .table_name(&self.table_name)
                            .key("id", AttributeValue::S(user_id.clone()))
                            .update_expression("ADD rating :delta")
                            .condition_expression("attribute_exists(id)")
                            .expression_attribute_values(
                                ":delta",
                                AttributeValue::N(delta.to_string()),
                            )
                            .build()
                            .map_err(|e| UserRepositoryError::Transaction(e.to_string()))?,
                    )
                    .build(),
            );
        }

        self.client
            .transact_write_items()
            .set_transact_items(Some(transaction_items))
            .send()
            .await
            .map_err(|e| UserRepositoryError::Transaction(e.to_string()))?;

        Ok(())
    }

    async fn top_by_rating(&self, limit: usize) -> Result<Vec<User>, UserRepositoryError> {
        let mut users = Vec::new();
        let mut start_key = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| UserRepositoryError::DynamoDb(e.to_string()))?;

            for item in output.items.unwrap_or_default() {
                let user: User = from_item(item)
                    .map_err(|e| UserRepositoryError::Serialization(e.to_string()))?;
                users.push(user);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        sort_leaderboard(&mut users);
        users.truncate(limit);
        Ok(users)
    }
}
