use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Database used when neither `MONGO_DATABASE` nor the URI path names one.
pub const FALLBACK_DATABASE: &str = "test";

/// MongoDB configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// MongoDB connection URI
    pub uri: String,
    /// Database name. When unset the URI's default database is used.
    pub database: Option<String>,
    /// Username for authentication (optional)
    pub username: Option<String>,
    /// Password for authentication (optional)
    pub password: Option<String>,
    /// Collection holding user records
    pub user_collection: String,
    /// Connection pool size
    pub pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// Load MongoDB configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MONGO_URI: MongoDB connection URI (required)
    /// - MONGO_DATABASE: Database name (optional)
    /// - MONGO_USER_COLLECTION: Collection name for users (defaults to "users")
    /// - MONGO_USERNAME / MONGO_PASSWORD: Credential (optional)
    /// - MONGO_POOL_SIZE: Connection pool size (defaults to 10)
    /// - MONGO_CONNECTION_TIMEOUT: Connection timeout in seconds (defaults to 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");

        let uri = env::var("MONGO_URI").map_err(|_| {
            error!("MONGO_URI environment variable not found");
            ConfigError::EnvVarNotFound("MONGO_URI".to_string())
        })?;

        let database = env::var("MONGO_DATABASE").ok();
        match database {
            Some(ref db) => debug!("MongoDB database: {}", db),
            None => debug!("No MongoDB database specified, deferring to the URI"),
        }

        let username = env::var("MONGO_USERNAME").ok();
        let password = env::var("MONGO_PASSWORD").ok();
        if username.is_some() {
            debug!("MongoDB credential provided");
        }

        let user_collection = env::var("MONGO_USER_COLLECTION").unwrap_or_else(|_| {
            debug!("MONGO_USER_COLLECTION not set, using default: users");
            "users".to_string()
        });

        let pool_size = env::var("MONGO_POOL_SIZE")
            .unwrap_or_else(|_| {
                warn!("MONGO_POOL_SIZE not set, using default: 10");
                "10".to_string()
            })
            .parse::<u32>()
            .map_err(|_| {
                error!("Invalid MONGO_POOL_SIZE value");
                ConfigError::InvalidValue("Invalid MONGO_POOL_SIZE value".to_string())
            })?;

        let connection_timeout_secs = env::var("MONGO_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| {
                warn!("MONGO_CONNECTION_TIMEOUT not set, using default: 5 seconds");
                "5".to_string()
            })
            .parse::<u64>()
            .map_err(|_| {
                error!("Invalid MONGO_CONNECTION_TIMEOUT value");
                ConfigError::InvalidValue("Invalid MONGO_CONNECTION_TIMEOUT value".to_string())
            })?;

        let config = MongoConfig {
            uri,
            database,
            username,
            password,
            user_collection,
            pool_size,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("MongoDB configuration loaded successfully");
        Ok(config)
    }

    /// Create MongoConfig for testing
    pub fn from_test_env() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: Some("roster_test".to_string()),
            username: None,
            password: None,
            user_collection: "test_users".to_string(),
            pool_size: 2,
            connection_timeout_secs: 2,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uri.is_empty() {
            error!("MongoDB URI is empty");
            return Err(ConfigError::ValidationError("MongoDB URI cannot be empty".to_string()));
        }

        if let Some(ref db) = self.database {
            if db.is_empty() {
                error!("MongoDB database is empty");
                return Err(ConfigError::ValidationError("MongoDB database cannot be empty if set".to_string()));
            }
        }

        if self.user_collection.is_empty() {
            error!("MongoDB user collection is empty");
            return Err(ConfigError::ValidationError("MongoDB user collection cannot be empty".to_string()));
        }

        if self.pool_size == 0 {
            error!("MongoDB pool size is 0");
            return Err(ConfigError::ValidationError("MongoDB pool size must be greater than 0".to_string()));
        }

        if self.connection_timeout_secs == 0 {
            error!("MongoDB connection timeout is 0");
            return Err(ConfigError::ValidationError("MongoDB connection timeout must be greater than 0".to_string()));
        }

        match (&self.username, &self.password) {
            (Some(user), _) if user.is_empty() => {
                return Err(ConfigError::ValidationError("MongoDB username cannot be empty if set".to_string()));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(ConfigError::ValidationError(
                    "MONGO_USERNAME and MONGO_PASSWORD must be set together".to_string(),
                ));
            }
            _ => {}
        }
        Ok(())
    }

    /// Picks the database: explicit setting, then the URI's default, then
    /// [`FALLBACK_DATABASE`].
    pub fn resolve_database(&self, uri_default: Option<&str>) -> String {
        self.database
            .as_deref()
            .or(uri_default)
            .unwrap_or(FALLBACK_DATABASE)
            .to_string()
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: None,
            username: None,
            password: None,
            user_collection: "users".to_string(),
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}
