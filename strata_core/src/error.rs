//! Errors surfaced by the migration engine.

use crate::adapter::{AdapterError, Dialect};
use crate::version::Version;

/// Errors that can occur during migration operations.
///
/// Every variant that names a version leaves the Version Store exactly as it
/// was before the failing step.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The Version Store already holds this version.
    ///
    /// Either a concurrent runner recorded it first or two Registry entries
    /// share a version.
    #[error("Migration {version} is already recorded")]
    DuplicateVersion {
        /// The rejected version.
        version: Version,
    },

    /// A forward or reverse action failed.
    #[error("Migration {version} ({name}) failed: {source}")]
    MigrationFailed {
        /// The version of the migration that failed.
        version: Version,
        /// The name of the migration.
        name: String,
        /// The backend failure.
        #[source]
        source: AdapterError,
    },

    /// The adapter declined an operation the migration needs.
    #[error("Migration {version}: {operation} is not supported on {dialect}, manual intervention required")]
    UnsupportedOperation {
        /// The migration that needed the operation.
        version: Version,
        /// Dialect in effect.
        dialect: Dialect,
        /// Description of the refused operation.
        operation: String,
    },

    /// The migration has no reverse action.
    #[error("Migration {version} ({name}) is irreversible")]
    Irreversible {
        /// The version of the migration.
        version: Version,
        /// The name of the migration.
        name: String,
    },

    /// A recorded version is not part of the Registry.
    #[error("Recorded migration {version} is unknown to this build")]
    UnknownVersion {
        /// The unknown version.
        version: Version,
    },

    /// The baseline schema could not be created.
    #[error("Bootstrap failed: {0}")]
    Bootstrap(#[source] AdapterError),

    /// A seeding routine failed.
    #[error("Seeding failed: {0}")]
    Seed(#[source] AdapterError),

    /// The Version Store or another adapter call outside a migration body failed.
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),
}

impl MigrationError {
    /// Attributes a failure raised inside a migration body to that migration.
    ///
    /// Adapter refusals become [`MigrationError::UnsupportedOperation`], other
    /// adapter failures become [`MigrationError::MigrationFailed`]. Errors
    /// that already carry context pass through. `dialect` is the dialect in
    /// effect, used when the refusal does not name one.
    pub fn attribute(self, version: Version, name: &str, dialect: Dialect) -> Self {
        match self {
            MigrationError::Adapter(err) | MigrationError::Seed(err) if err.is_unsupported() => {
                MigrationError::UnsupportedOperation {
                    version,
                    dialect: err.dialect.0.unwrap_or(dialect),
                    operation: err.message,
                }
            }
            MigrationError::Adapter(source) | MigrationError::Seed(source) => {
                MigrationError::MigrationFailed {
                    version,
                    name: name.to_string(),
                    source,
                }
            }
            other => other,
        }
    }

    /// The version the error is about, when it names one.
    pub fn version(&self) -> Option<Version> {
        match self {
            MigrationError::DuplicateVersion { version }
            | MigrationError::MigrationFailed { version, .. }
            | MigrationError::UnsupportedOperation { version, .. }
            | MigrationError::Irreversible { version, .. }
            | MigrationError::UnknownVersion { version } => Some(*version),
            _ => None,
        }
    }
}
