//! Migration descriptors and the registry that orders them.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use crate::adapter::{AdapterError, Dialect, DialectAdapter};
use crate::error::MigrationError;
use crate::seed::Seeder;
use crate::version::Version;

/// What a migration body gets to work with.
pub struct MigrationContext<'a> {
    adapter: &'a dyn DialectAdapter,
    seeder: Option<&'a dyn Seeder>,
}

impl<'a> MigrationContext<'a> {
    /// Creates a context over an adapter and an optional seeder.
    pub fn new(adapter: &'a dyn DialectAdapter, seeder: Option<&'a dyn Seeder>) -> Self {
        Self { adapter, seeder }
    }

    /// The dialect adapter in effect.
    pub fn adapter(&self) -> &'a dyn DialectAdapter {
        self.adapter
    }

    /// Shorthand for `adapter().dialect()`.
    pub fn dialect(&self) -> Dialect {
        self.adapter.dialect()
    }

    /// Runs the seeder's permission routine. Fails when no seeder is bound.
    pub async fn seed_permissions(&self) -> Result<HashMap<String, i64>, MigrationError> {
        self.seeder()?
            .seed_permissions(self.adapter)
            .await
            .map_err(MigrationError::Seed)
    }

    /// Runs the seeder's role routine. Fails when no seeder is bound.
    pub async fn seed_roles(
        &self,
        permission_ids: &HashMap<String, i64>,
    ) -> Result<HashMap<String, i64>, MigrationError> {
        self.seeder()?
            .seed_roles(self.adapter, permission_ids)
            .await
            .map_err(MigrationError::Seed)
    }

    fn seeder(&self) -> Result<&'a dyn Seeder, MigrationError> {
        self.seeder.ok_or_else(|| {
            MigrationError::Seed(AdapterError::other("migration requires a seeder but none is bound"))
        })
    }
}

/// Represents a single versioned migration.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use strata_core::prelude::*;
///
/// pub struct AddWidgetColor;
///
/// #[async_trait]
/// impl Migration for AddWidgetColor {
///     fn version(&self) -> Version { Version::new(1, 2, 0) }
///
///     fn name(&self) -> &'static str { "add_widget_color" }
///
///     fn description(&self) -> &'static str { "Adds widgets.color" }
///
///     async fn up(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
///         ctx.adapter()
///             .add_column("widgets", &ColumnDef::new("color", ColumnType::Text))
///             .await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Migration: Send + Sync {
    /// Unique version. Registry order must match ascending version order.
    fn version(&self) -> Version;

    /// Short machine-safe name (e.g., "add_user_display_name").
    fn name(&self) -> &'static str;

    /// Human readable description.
    fn description(&self) -> &'static str;

    /// Forward action.
    ///
    /// Must be idempotent: against a backend already in the target state it
    /// has to detect that and do nothing.
    async fn up(&self, ctx: &MigrationContext<'_>) -> Result<(), MigrationError>;

    /// Whether [`down`](Self::down) is implemented.
    fn reversible(&self) -> bool {
        false
    }

    /// Reverse action. Migrations are irreversible unless they override this.
    async fn down(&self, _ctx: &MigrationContext<'_>) -> Result<(), MigrationError> {
        Err(MigrationError::Irreversible {
            version: self.version(),
            name: self.name().to_string(),
        })
    }
}

/// Authoring mistakes detected by [`Registry::check`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// An entry is not strictly greater than its predecessor.
    #[error("migration {next} is listed after {previous}")]
    OutOfOrder {
        /// The earlier entry.
        previous: Version,
        /// The later entry.
        next: Version,
    },
    /// Two entries share a name.
    #[error("migration name '{0}' is used twice")]
    DuplicateName(String),
}

/// The ordered list of migrations baked into a program.
///
/// The runner applies entries in the order they were registered and never
/// sorts them; [`check`](Self::check) is how authors verify that this order
/// matches version order.
#[derive(Default)]
pub struct Registry {
    migrations: Vec<Box<dyn Migration>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a migration.
    pub fn register(mut self, migration: impl Migration + 'static) -> Self {
        self.migrations.push(Box::new(migration));
        self
    }

    /// Iterates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Migration> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    /// Looks up a migration by version.
    pub fn get(&self, version: Version) -> Option<&dyn Migration> {
        self.iter().find(|m| m.version() == version)
    }

    /// The version of the last entry.
    pub fn target_version(&self) -> Option<Version> {
        self.migrations.last().map(|m| m.version())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// True when no migrations are registered.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Verifies that versions strictly ascend and names are unique.
    pub fn check(&self) -> Result<(), RegistryError> {
        let mut names = HashSet::new();
        let mut previous: Option<Version> = None;

        for migration in self.iter() {
            if let Some(previous) = previous {
                if migration.version() <= previous {
                    return Err(RegistryError::OutOfOrder {
                        previous,
                        next: migration.version(),
                    });
                }
            }
            if !names.insert(migration.name()) {
                return Err(RegistryError::DuplicateName(migration.name().to_string()));
            }
            previous = Some(migration.version());
        }
        Ok(())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|m| format!("{} ({})", m.version(), m.name())))
            .finish()
    }
}
