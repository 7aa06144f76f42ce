use async_trait::async_trait;
use strata_core::{Migration, MigrationContext, MigrationError, Version};

use crate::catalog::tables;

/// Creates `audit_log`.
pub struct CreateAuditLog;

#[async_trait]
impl Migration for CreateAuditLog {
    fn version(&self) -> Version {
        Version::new(1, 2, 0)
    }

    fn name(&self) -> &'static str {
        "create_audit_log"
    }

    fn description(&self) -> &'static str {
        "Creates the audit_log table"
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        ctx.adapter().create_table(&tables::audit_log()).await?;
        Ok(())
    }

    fn reversible(&self) -> bool {
        true
    }

    async fn down(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        ctx.adapter().drop_table("audit_log").await?;
        Ok(())
    }
}
