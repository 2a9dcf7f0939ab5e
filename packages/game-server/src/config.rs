use std::fmt;
use std::str::FromStr;

use shared::services::room_service::GameSettings;

const DEFAULT_PORT: u16 = 4000;

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Memory,
    DynamoDb {
        users_table: String,
        matches_table: String,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub jwt_secret: String,
    pub port: u16,
    pub settings: GameSettings,
    pub storage: StorageBackend,
    pub client_origin: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} environment variable must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let port = parse_or(&get, "PORT", DEFAULT_PORT)?;

        let defaults = GameSettings::default();
        let settings = GameSettings {
            board_size: parse_or(&get, "BOARD_SIZE", defaults.board_size)?,
            win_length: parse_or(&get, "WIN_LENGTH", defaults.win_length)?,
            turn_seconds: parse_or(&get, "TURN_SECONDS", defaults.turn_seconds)?,
        };
        if settings.board_size < 3 {
            return Err(invalid("BOARD_SIZE", settings.board_size));
        }
        if settings.win_length < 3 || settings.win_length > settings.board_size {
            return Err(invalid("WIN_LENGTH", settings.win_length));
        }
        if settings.turn_seconds == 0 {
            return Err(invalid("TURN_SECONDS", settings.turn_seconds));
        }

        let storage = match get("STORAGE_BACKEND").as_deref() {
            None | Some("memory") => StorageBackend::Memory,
            Some("dynamodb") => StorageBackend::DynamoDb {
                users_table: get("USERS_TABLE").ok_or(ConfigError::Missing("USERS_TABLE"))?,
                matches_table: get("MATCHES_TABLE")
                    .ok_or(ConfigError::Missing("MATCHES_TABLE"))?,
            },
            Some(other) => return Err(invalid("STORAGE_BACKEND", other)),
        };

        Ok(ServerConfig {
            jwt_secret,
            port,
            settings,
            storage,
            client_origin: get("CLIENT_ORIGIN"),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw,
        }),
        None => Ok(default),
    }
}

fn invalid(key: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("JWT_SECRET", "s")]).unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.settings.board_size, 15);
        assert_eq!(config.settings.win_length, 5);
        assert_eq!(config.settings.turn_seconds, 30);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.client_origin, None);
    }

    #[test]
    fn test_secret_is_required() {
        assert_eq!(
            config(&[]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
        assert_eq!(
            config(&[("JWT_SECRET", "  ")]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(matches!(
            config(&[("JWT_SECRET", "s"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("JWT_SECRET", "s"), ("BOARD_SIZE", "9"), ("WIN_LENGTH", "10")]),
            Err(ConfigError::Invalid { key: "WIN_LENGTH", .. })
        ));
        assert!(matches!(
            config(&[("JWT_SECRET", "s"), ("TURN_SECONDS", "0")]),
            Err(ConfigError::Invalid { key: "TURN_SECONDS", .. })
        ));
    }

    #[test]
    fn test_dynamodb_backend_needs_tables() {
        assert_eq!(
            config(&[("JWT_SECRET", "s"), ("STORAGE_BACKEND", "dynamodb")]).unwrap_err(),
            ConfigError::Missing("USERS_TABLE")
        );

        let config = config(&[
            ("JWT_SECRET", "s"),
            ("STORAGE_BACKEND", "dynamodb"),
            ("USERS_TABLE", "users"),
            ("MATCHES_TABLE", "matches"),
        ])
        .unwrap();

        assert_eq!(
            config.storage,
            StorageBackend::DynamoDb {
                users_table: "users".to_string(),
                matches_table: "matches".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_backend() {
        assert!(matches!(
            config(&[("JWT_SECRET", "s"), ("STORAGE_BACKEND", "redis")]),
            Err(ConfigError::Invalid { key: "STORAGE_BACKEND", .. })
        ));
    }
}
