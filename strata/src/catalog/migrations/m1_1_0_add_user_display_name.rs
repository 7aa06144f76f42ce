use async_trait::async_trait;
use strata_core::schema::{ColumnDef, ColumnType};
use strata_core::{Migration, MigrationContext, MigrationError, Version};

/// Adds the optional `users.display_name`.
pub struct AddUserDisplayName;

#[async_trait]
impl Migration for AddUserDisplayName {
    fn version(&self) -> Version {
        Version::new(1, 1, 0)
    }

    fn name(&self) -> &'static str {
        "add_user_display_name"
    }

    fn description(&self) -> &'static str {
        "Adds users.display_name"
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        ctx.adapter()
            .add_column("users", &ColumnDef::new("display_name", ColumnType::Text))
            .await?;
        Ok(())
    }

    fn reversible(&self) -> bool {
        true
    }

    async fn down(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        ctx.adapter().drop_column("users", "display_name").await?;
        Ok(())
    }
}
