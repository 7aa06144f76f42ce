//! Migration 1.3.0: the `auditor` role.
//!
//! Installs bootstrapped before this release were seeded without the
//! `audit.read` permission and the `auditor` role. Re-running the seeder
//! adds both and leaves existing rows alone.

use async_trait::async_trait;
use strata_core::{Migration, MigrationContext, MigrationError, Version};

/// Seeds `audit.read` and the `auditor` role.
pub struct SeedAuditorRole;

#[async_trait]
impl Migration for SeedAuditorRole {
    fn version(&self) -> Version {
        Version::new(1, 3, 0)
    }

    fn name(&self) -> &'static str {
        "seed_auditor_role"
    }

    fn description(&self) -> &'static str {
        "Seeds the audit.read permission and the auditor role"
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        let permissions = ctx.seed_permissions().await?;
        ctx.seed_roles(&permissions).await?;
        Ok(())
    }
}
