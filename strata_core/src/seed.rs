//! Seeding side-channel definitions

use async_trait::async_trait;
use std::collections::HashMap;

use crate::adapter::{AdapterError, DialectAdapter};

/// Populates permissions, roles and other system rows.
///
/// Both routines must be safe to call repeatedly: when the rows already
/// exist they return the existing identifiers instead of failing or
/// inserting duplicates. The runner calls them once after bootstrapping a
/// fresh store, and migration bodies may call them again through
/// [`MigrationContext`](crate::MigrationContext).
#[async_trait]
pub trait Seeder: Send + Sync {
    /// Ensures every known permission exists and returns `name -> id`.
    async fn seed_permissions(
        &self,
        adapter: &dyn DialectAdapter,
    ) -> Result<HashMap<String, i64>, AdapterError>;

    /// Ensures every known role exists, links it to its permissions and
    /// returns `role name -> id`.
    async fn seed_roles(
        &self,
        adapter: &dyn DialectAdapter,
        permission_ids: &HashMap<String, i64>,
    ) -> Result<HashMap<String, i64>, AdapterError>;
}
