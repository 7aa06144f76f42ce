//! The Version Store: the persisted ledger of applied migrations.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::adapter::{AdapterError, DialectAdapter};
use crate::error::MigrationError;
use crate::migration::Migration;
use crate::schema::{ColumnDef, ColumnDefault, ColumnType, TableShape};
use crate::value::{Row, Value};
use crate::version::Version;

/// Name of the tracking table.
pub const MIGRATIONS_TABLE: &str = "strata_migrations";

/// Record of a migration that has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedMigrationRecord {
    /// The version of the migration.
    pub version: Version,
    /// The name of the migration.
    pub name: String,
    /// The description recorded with the migration.
    pub description: Option<String>,
    /// When the migration was recorded, assigned by the backend.
    pub applied_at: DateTime<Utc>,
}

impl AppliedMigrationRecord {
    fn from_row(row: &Row) -> Result<Self, AdapterError> {
        let decode = |column: &str| {
            AdapterError::decode(format!("{MIGRATIONS_TABLE}.{column} holds an unexpected value"))
        };

        let version = row
            .get_str("version")
            .ok_or_else(|| decode("version"))?
            .parse::<Version>()
            .map_err(|e| decode("version").with_source(e))?;
        let name = row
            .get_str("name")
            .ok_or_else(|| decode("name"))?
            .to_string();
        let description = row.get_str("description").map(str::to_string);
        let applied_at = row
            .get("applied_at")
            .and_then(Value::as_timestamp)
            .ok_or_else(|| decode("applied_at"))?;

        Ok(Self {
            version,
            name,
            description,
            applied_at,
        })
    }
}

/// Reads and appends rows of the tracking table.
///
/// The table carries a unique constraint on `version`; that constraint, not
/// application logic, is what rejects a second record of the same version.
#[derive(Clone)]
pub struct VersionStore {
    adapter: Arc<dyn DialectAdapter>,
}

impl VersionStore {
    /// Creates a store over the given adapter.
    pub fn new(adapter: Arc<dyn DialectAdapter>) -> Self {
        Self { adapter }
    }

    /// The tracking table's shape.
    pub fn table_shape() -> TableShape {
        TableShape::new(MIGRATIONS_TABLE)
            .column(ColumnDef::id())
            .column(ColumnDef::new("version", ColumnType::Text).not_null().unique())
            .column(ColumnDef::new("name", ColumnType::Text).not_null())
            .column(ColumnDef::new("description", ColumnType::Text))
            .column(
                ColumnDef::new("applied_at", ColumnType::Timestamp)
                    .not_null()
                    .default(ColumnDefault::CurrentTimestamp),
            )
    }

    /// Creates the tracking table if absent.
    pub async fn ensure_exists(&self) -> Result<(), MigrationError> {
        self.adapter.create_table(&Self::table_shape()).await?;
        Ok(())
    }

    /// Returns all records in insertion order.
    ///
    /// A missing table reads as an empty ledger.
    pub async fn list_applied(&self) -> Result<Vec<AppliedMigrationRecord>, MigrationError> {
        if !self.adapter.table_exists(MIGRATIONS_TABLE).await? {
            return Ok(Vec::new());
        }

        let rows = self
            .adapter
            .fetch_all(
                &format!(
                    "SELECT version, name, description, applied_at FROM {MIGRATIONS_TABLE} ORDER BY id ASC"
                ),
                &[],
            )
            .await?;

        Ok(rows
            .iter()
            .map(AppliedMigrationRecord::from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// The version of the most recently recorded migration.
    pub async fn current_version(&self) -> Result<Option<Version>, MigrationError> {
        Ok(self.list_applied().await?.last().map(|r| r.version))
    }

    /// Records a migration as applied.
    ///
    /// Fails with [`MigrationError::DuplicateVersion`] when the version is
    /// already present.
    pub async fn record(&self, migration: &dyn Migration) -> Result<(), MigrationError> {
        let version = migration.version();
        let result = self
            .adapter
            .execute(
                &format!(
                    "INSERT INTO {MIGRATIONS_TABLE} (version, name, description) VALUES ($1, $2, $3)"
                ),
                &[
                    Value::Text(version.to_string()),
                    Value::Text(migration.name().to_string()),
                    Value::Text(migration.description().to_string()),
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if err.is_unique_violation() => {
                Err(MigrationError::DuplicateVersion { version })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removes the record of `version`. Only used when reverting.
    pub async fn remove(&self, version: Version) -> Result<(), MigrationError> {
        self.adapter
            .execute(
                &format!("DELETE FROM {MIGRATIONS_TABLE} WHERE version = $1"),
                &[Value::Text(version.to_string())],
            )
            .await?;
        Ok(())
    }
}
