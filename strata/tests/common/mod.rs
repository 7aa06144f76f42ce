#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use strata::prelude::*;
use strata_sqlite::SqliteAdapter;

pub async fn memory_adapter() -> Arc<dyn DialectAdapter> {
    let _ = env_logger::builder().is_test(true).try_init();
    Arc::new(
        SqliteAdapter::in_memory()
            .await
            .expect("Failed to open in-memory sqlite database"),
    )
}

pub fn v(major: u32, minor: u32, patch: u32) -> Version {
    Version::new(major, minor, patch)
}

/// Shared call counter.
#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Creates a table named after the migration.
pub struct CreateTable {
    pub version: Version,
    pub name: &'static str,
    pub table: &'static str,
    pub calls: Calls,
}

impl CreateTable {
    pub fn new(version: Version, name: &'static str, table: &'static str) -> Self {
        Self {
            version,
            name,
            table,
            calls: Calls::default(),
        }
    }
}

#[async_trait]
impl Migration for CreateTable {
    fn version(&self) -> Version {
        self.version
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "Creates a test table"
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        self.calls.hit();
        ctx.adapter()
            .create_table(
                &TableShape::new(self.table)
                    .column(ColumnDef::id())
                    .column(ColumnDef::new("label", ColumnType::Text).not_null()),
            )
            .await?;
        Ok(())
    }

    fn reversible(&self) -> bool {
        true
    }

    async fn down(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        ctx.adapter().drop_table(self.table).await?;
        Ok(())
    }
}

/// Runs a statement against a table that does not exist.
pub struct Broken {
    pub version: Version,
}

#[async_trait]
impl Migration for Broken {
    fn version(&self) -> Version {
        self.version
    }

    fn name(&self) -> &'static str {
        "broken"
    }

    fn description(&self) -> &'static str {
        "Writes into a missing table"
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        ctx.adapter()
            .execute("INSERT INTO no_such_table (x) VALUES ($1)", &[Value::Integer(1)])
            .await?;
        Ok(())
    }
}

/// Drops a column in place, which the embedded dialect refuses.
pub struct DropsColumn {
    pub version: Version,
}

#[async_trait]
impl Migration for DropsColumn {
    fn version(&self) -> Version {
        self.version
    }

    fn name(&self) -> &'static str {
        "drops_column"
    }

    fn description(&self) -> &'static str {
        "Drops widgets.label in place"
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        ctx.adapter().drop_column("widgets", "label").await?;
        Ok(())
    }
}

/// Records how often the baseline runs and which versions it covers.
pub struct CountingBaseline {
    pub calls: Calls,
    pub covers: Vec<Version>,
}

#[async_trait]
impl Bootstrapper for CountingBaseline {
    async fn bootstrap(&self, adapter: &dyn DialectAdapter) -> Result<(), AdapterError> {
        self.calls.hit();
        adapter
            .create_table(&TableShape::new("baseline").column(ColumnDef::id()))
            .await
    }

    fn covers(&self, version: Version) -> bool {
        self.covers.contains(&version)
    }
}

/// A seeder that only counts its calls.
pub struct CountingSeeder {
    pub permissions: Calls,
    pub roles: Calls,
}

#[async_trait]
impl Seeder for CountingSeeder {
    async fn seed_permissions(
        &self,
        _adapter: &dyn DialectAdapter,
    ) -> Result<HashMap<String, i64>, AdapterError> {
        self.permissions.hit();
        Ok(HashMap::from([("things.read".to_string(), 1)]))
    }

    async fn seed_roles(
        &self,
        _adapter: &dyn DialectAdapter,
        permission_ids: &HashMap<String, i64>,
    ) -> Result<HashMap<String, i64>, AdapterError> {
        self.roles.hit();
        assert!(permission_ids.contains_key("things.read"));
        Ok(HashMap::from([("reader".to_string(), 1)]))
    }
}
