use axum::http::HeaderValue;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_MONGODB_DATABASE: &str = "studentdb";
const DEFAULT_MONGODB_COLLECTION: &str = "students";
const DEFAULT_MONGODB_TIMEOUT_SECS: u64 = 5;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the student records server.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the HTTP server listens on.
    pub port: u16,
    /// Storage backend serving the API.
    pub store_backend: StoreBackend,
    /// MongoDB settings, present only when the `mongo` backend is selected.
    pub mongo: Option<MongoConfig>,
    /// Single origin allowed by the CORS policy.
    pub cors_origin: HeaderValue,
}

/// Connection settings for the MongoDB backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`.
    pub uri: String,
    /// Database holding the student collection.
    pub database: String,
    /// Collection storing one document per student.
    pub collection: String,
    /// Upper bound for each database round trip.
    pub timeout: Duration,
}

/// Supported storage backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local store; records are lost on restart.
    Memory,
    /// Single MongoDB collection.
    Mongo,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = optional("PORT")
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".into()))
            })
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        let store_backend = optional("STORE_BACKEND")
            .map(|value| {
                value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("STORE_BACKEND".into()))
            })
            .transpose()?
            .unwrap_or(StoreBackend::Memory);

        let mongo = match store_backend {
            StoreBackend::Memory => None,
            StoreBackend::Mongo => Some(MongoConfig {
                uri: optional("MONGODB_URI")
                    .ok_or_else(|| ConfigError::MissingVariable("MONGODB_URI".into()))?,
                database: optional("MONGODB_DATABASE")
                    .unwrap_or_else(|| DEFAULT_MONGODB_DATABASE.to_string()),
                collection: optional("MONGODB_COLLECTION")
                    .unwrap_or_else(|| DEFAULT_MONGODB_COLLECTION.to_string()),
                timeout: optional("MONGODB_TIMEOUT_SECS")
                    .map(|value| {
                        value
                            .trim()
                            .parse::<u64>()
                            .ok()
                            .filter(|secs| *secs > 0)
                            .ok_or_else(|| ConfigError::InvalidValue("MONGODB_TIMEOUT_SECS".into()))
                    })
                    .transpose()?
                    .map_or(
                        Duration::from_secs(DEFAULT_MONGODB_TIMEOUT_SECS),
                        Duration::from_secs,
                    ),
            }),
        };

        let cors_origin = optional("CORS_ORIGIN")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("CORS_ORIGIN".into()))?;

        Ok(Self {
            port,
            store_backend,
            mongo,
            cors_origin,
        })
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            _ => Err(()),
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment and install it in the process-wide cache.
///
/// Later calls return the first configuration loaded. A missing `.env` file is fine; a missing
/// or malformed required variable is not.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        port = config.port,
        backend = ?config.store_backend,
        cors_origin = ?config.cors_origin,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
