use async_trait::async_trait;
use strata_core::{AdapterError, Bootstrapper, DialectAdapter, Version};

use super::tables;

/// The last version whose effect the baseline already contains.
pub const BASELINE_VERSION: Version = Version::new(1, 0, 0);

/// Creates the application's baseline tables on a fresh database.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppBaseline;

#[async_trait]
impl Bootstrapper for AppBaseline {
    async fn bootstrap(&self, adapter: &dyn DialectAdapter) -> Result<(), AdapterError> {
        for table in tables::baseline() {
            log::debug!("Creating baseline table {}", table.name);
            adapter.create_table(&table).await?;
        }
        Ok(())
    }

    fn covers(&self, version: Version) -> bool {
        version <= BASELINE_VERSION
    }
}
