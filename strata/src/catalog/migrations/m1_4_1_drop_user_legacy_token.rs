use async_trait::async_trait;
use strata_core::schema::ColumnChange;
use strata_core::{Migration, MigrationContext, MigrationError, Version};

use crate::catalog::tables;

/// Removes `users.legacy_token`.
///
/// Goes through `alter_table` rather than `drop_column` so the embedded
/// dialect can rebuild the table.
pub struct DropUserLegacyToken;

#[async_trait]
impl Migration for DropUserLegacyToken {
    fn version(&self) -> Version {
        Version::new(1, 4, 1)
    }

    fn name(&self) -> &'static str {
        "drop_user_legacy_token"
    }

    fn description(&self) -> &'static str {
        "Drops users.legacy_token"
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        let changes = [ColumnChange::Drop {
            column: "legacy_token".to_string(),
        }];
        ctx.adapter()
            .alter_table(&tables::users_v1_4_1(), &changes)
            .await?;
        Ok(())
    }
}
