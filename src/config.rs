use std::collections::HashMap;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "file:./dev.db";
const DEFAULT_TOKEN_TTL_SECS: &str = "604800"; // 7 days

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub auth_secret: String,
    pub token_ttl_secs: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        // The bootstrapper treats anything that is not a file: URL as a
        // placeholder, so the raw value is passed through untouched.
        let database_url = env_map
            .get("DATABASE_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let auth_secret = env_map
            .get("AUTH_SECRET")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("AUTH_SECRET".to_string()))?;

        let token_ttl_secs = env_map
            .get("TOKEN_TTL_SECS")
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS)
            .parse::<i64>()
            .ok()
            .filter(|ttl| *ttl > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "TOKEN_TTL_SECS".to_string(),
                    "must be a positive i64".to_string(),
                )
            })?;

        Ok(Config {
            port,
            database_url,
            auth_secret,
            token_ttl_secs,
        })
    }
}
