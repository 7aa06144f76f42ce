//! Migration 1.4.0: `users.email` becomes mandatory.
//!
//! Accounts without an address get a placeholder. Irreversible: the
//! placeholder cannot be told apart from a real address afterwards.

use async_trait::async_trait;
use strata_core::schema::ColumnChange;
use strata_core::{Migration, MigrationContext, MigrationError, Value, Version};

use crate::catalog::tables;

/// Address written into accounts that have none.
pub const PLACEHOLDER_EMAIL: &str = "unknown@localhost";

/// Makes `users.email` NOT NULL.
pub struct RequireUserEmail;

#[async_trait]
impl Migration for RequireUserEmail {
    fn version(&self) -> Version {
        Version::new(1, 4, 0)
    }

    fn name(&self) -> &'static str {
        "require_user_email"
    }

    fn description(&self) -> &'static str {
        "Backfills and requires users.email"
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        let changes = [ColumnChange::SetNotNull {
            column: "email".to_string(),
            backfill: Some(Value::from(PLACEHOLDER_EMAIL)),
        }];
        ctx.adapter()
            .alter_table(&tables::users_v1_4(), &changes)
            .await?;
        Ok(())
    }
}
