//! # Strata
//!
//! Schema migration engine for SQLite and PostgreSQL.
//!
//! ```rust,ignore
//! use strata::prelude::*;
//!
//! let config = DatabaseConfig::load()?;
//! let adapter = config.connect().await?;
//! let result = strata::catalog::migrator(adapter).migrate().await?;
//! ```

#![deny(missing_docs)]

/// The application schema: baseline, migrations and access seeding.
pub mod catalog;

/// Database selection from the environment.
pub mod config;

pub use config::{ConfigError, DatabaseConfig};
pub use strata_core::*;

#[cfg(feature = "sqlite")]
/// The embedded dialect adapter.
pub mod sqlite {
    //! Contains the sqlite adapter.
    pub use strata_sqlite::*;
}

#[cfg(feature = "postgres")]
/// The server dialect adapter.
pub mod postgres {
    //! Contains the postgres adapter.
    pub use strata_pg::*;
}

pub mod prelude {
    //! The prelude module for the `strata` crate.
    pub use strata_core::prelude::*;

    pub use super::config::{ConfigError, DatabaseConfig};

    #[cfg(feature = "postgres")]
    pub use super::postgres::PgAdapter;
    #[cfg(feature = "sqlite")]
    pub use super::sqlite::SqliteAdapter;
}
