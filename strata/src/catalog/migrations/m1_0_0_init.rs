//! Migration 1.0.0: the baseline tables.
//!
//! A fresh install gets these from the bootstrapper and only records this
//! version. The body exists for stores that were created empty by hand.

use async_trait::async_trait;
use strata_core::{Migration, MigrationContext, MigrationError, Version};

use crate::catalog::tables;

/// Creates the baseline tables.
pub struct Init;

#[async_trait]
impl Migration for Init {
    fn version(&self) -> Version {
        Version::new(1, 0, 0)
    }

    fn name(&self) -> &'static str {
        "init"
    }

    fn description(&self) -> &'static str {
        "Creates permissions, roles, users and settings"
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        for table in tables::baseline() {
            ctx.adapter().create_table(&table).await?;
        }
        Ok(())
    }
}
