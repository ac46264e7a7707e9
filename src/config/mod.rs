//! Runtime configuration.
//!
//! Everything is read from `VIGILANCE__`-prefixed variables (a `.env` file is
//! honoured in development), with `__` separating nested sections:
//!
//! | Variable | Field |
//! |---|---|
//! | `VIGILANCE__SERVER__PORT` | `server.port` |
//! | `VIGILANCE__DATABASE__URL` | `database.url` |
//! | `VIGILANCE__GAMEPLAY__TRANSACTION_TIMEOUT_MS` | `gameplay.transaction_timeout_ms` |
//!
//! ```no_run
//! use vigilance_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("configuration");
//! config.validate().expect("valid configuration");
//! ```

mod database;
mod error;
mod gameplay;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gameplay::GameplayConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// All configuration sections. Every section has defaults, so an empty
/// environment yields a runnable in-memory server.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Absent means progress lives in memory for the life of the process.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub gameplay: GameplayConfig,
}

impl AppConfig {
    /// Reads `.env` (if any) and the process environment.
    ///
    /// # Errors
    ///
    /// `ConfigError::LoadError` when a variable cannot be parsed into its field.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = config::Environment::default()
            .prefix("VIGILANCE")
            .prefix_separator("__")
            .separator("__");

        Ok(config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?)
    }

    /// Checks each section; the database section only when present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database
            .as_ref()
            .map_or(Ok(()), DatabaseConfig::validate)?;
        self.gameplay.validate()
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
