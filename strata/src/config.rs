//! Database configuration loaded from `STRATA_*` environment variables.
//!
//! | variable | meaning |
//! |---|---|
//! | `STRATA_DATABASE_URL` | connection string, required |
//! | `STRATA_DIALECT` | `sqlite` or `postgres`; inferred from the URL when unset |
//! | `STRATA_MAX_CONNECTIONS` | pool size, defaults to 5 |

use figment::{Figment, providers::Env};
use serde::Deserialize;
use std::sync::Arc;
use strata_core::{AdapterError, Dialect, DialectAdapter};

/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Errors raised while resolving or opening the configured database.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The environment could not be extracted.
    #[error("invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// No dialect was given and the URL scheme names none.
    #[error("cannot infer a dialect from database url '{0}'")]
    UnknownDialect(String),

    /// The dialect's adapter was not compiled in.
    #[error("the {0} adapter is not enabled in this build")]
    DialectDisabled(Dialect),

    /// Connecting failed.
    #[error(transparent)]
    Connect(#[from] AdapterError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Which database the migrator binds to. Resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string (`sqlite://app.db`, `postgres://...`).
    #[serde(rename = "database_url")]
    pub url: String,
    /// Explicit dialect. When `None` it is inferred from `url`.
    #[serde(default)]
    pub dialect: Option<Dialect>,
    /// Maximum pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl DatabaseConfig {
    /// Builds a config for `url` with the dialect inferred.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dialect: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Loads the config from `STRATA_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Figment::new().merge(Env::prefixed("STRATA_")))
    }

    /// Extracts the config from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.resolved_dialect()?;
        Ok(config)
    }

    /// The explicit dialect, or the one named by the URL scheme.
    pub fn resolved_dialect(&self) -> Result<Dialect, ConfigError> {
        if let Some(dialect) = self.dialect {
            return Ok(dialect);
        }
        let scheme = self
            .url
            .split_once(':')
            .map(|(scheme, _)| scheme)
            .unwrap_or_default();
        scheme
            .parse()
            .map_err(|_| ConfigError::UnknownDialect(self.url.clone()))
    }

    /// Opens a pool for the configured dialect and wraps it in its adapter.
    pub async fn connect(&self) -> Result<Arc<dyn DialectAdapter>, ConfigError> {
        let dialect = self.resolved_dialect()?;
        log::info!("Connecting to {} database", dialect);

        match dialect {
            #[cfg(feature = "sqlite")]
            Dialect::Sqlite => {
                let adapter =
                    strata_sqlite::SqliteAdapter::connect(&self.url, self.max_connections).await?;
                Ok(Arc::new(adapter))
            }
            #[cfg(feature = "postgres")]
            Dialect::Postgres => {
                let adapter = strata_pg::PgAdapter::connect(&self.url, self.max_connections).await?;
                Ok(Arc::new(adapter))
            }
            #[allow(unreachable_patterns)]
            other => Err(ConfigError::DialectDisabled(other)),
        }
    }
}
