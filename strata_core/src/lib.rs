//! # Strata core
//!
//! Dialect-neutral pieces of the strata migration engine: versions, schema
//! shapes, the [`DialectAdapter`] seam, the Version Store and the
//! [`Migrator`] that ties them together.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata_core::prelude::*;
//!
//! let migrator = Migrator::new(Arc::new(adapter), registry)
//!     .with_bootstrapper(baseline)
//!     .with_seeder(seeder);
//!
//! let result = migrator.migrate().await?;
//! println!("Applied {:?}", result.applied_versions);
//! ```

#![deny(missing_docs)]

mod adapter;
mod bootstrap;
mod error;
mod migration;
mod runner;
pub mod schema;
mod seed;
mod store;
mod value;
mod version;

pub use adapter::{AdapterError, AdapterErrorKind, Dialect, DialectAdapter, DialectTag};
pub use bootstrap::{Bootstrapper, EmptyBaseline};
pub use error::MigrationError;
pub use migration::{Migration, MigrationContext, Registry, RegistryError};
pub use runner::{MigrationStatus, Migrator, RunResult};
pub use seed::Seeder;
pub use store::{AppliedMigrationRecord, MIGRATIONS_TABLE, VersionStore};
pub use value::{Row, Value};
pub use version::{Version, VersionParseError};

pub mod prelude {
    //! The prelude module for the `strata_core` crate.
    pub use super::schema::{
        ColumnChange, ColumnDef, ColumnDefault, ColumnInfo, ColumnType, IndexDef, TableShape,
    };
    pub use super::{
        AdapterError, AdapterErrorKind, AppliedMigrationRecord, Bootstrapper, Dialect,
        DialectAdapter, Migration, MigrationContext, MigrationError, MigrationStatus, Migrator,
        Registry, Row, RunResult, Seeder, Value, Version,
    };
}
