//! The migration runner.

use std::collections::HashSet;
use std::sync::Arc;

use crate::adapter::DialectAdapter;
use crate::bootstrap::{Bootstrapper, EmptyBaseline};
use crate::error::MigrationError;
use crate::migration::{Migration, MigrationContext, Registry};
use crate::seed::Seeder;
use crate::store::{AppliedMigrationRecord, VersionStore};
use crate::version::Version;

/// Outcome of a successful [`Migrator::migrate`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// True when the Version Store was empty at the start of the call.
    pub was_first_run: bool,
    /// Versions recorded by this call, in the order they were applied.
    pub applied_versions: Vec<Version>,
    /// Highest recorded version after the call.
    pub current_version: Option<Version>,
    /// Highest recorded version before the call; `None` on a first run.
    pub previous_version: Option<Version>,
}

/// Read-only view returned by [`Migrator::status`].
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationStatus {
    /// Highest recorded version.
    pub current_version: Option<Version>,
    /// Version of the last Registry entry.
    pub target_version: Option<Version>,
    /// Registry entries not yet recorded, in Registry order.
    pub pending_versions: Vec<Version>,
    /// Every recorded migration, in insertion order.
    pub applied: Vec<AppliedMigrationRecord>,
}

impl MigrationStatus {
    /// True when nothing is pending.
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }
}

/// Applies the migrations of a [`Registry`] through one [`DialectAdapter`].
///
/// Migrations are applied in Registry order, each exactly once. A migration
/// is recorded in the Version Store only after its forward action returned
/// successfully; the first failure stops the run and nothing after it is
/// attempted.
pub struct Migrator {
    adapter: Arc<dyn DialectAdapter>,
    store: VersionStore,
    registry: Registry,
    bootstrapper: Arc<dyn Bootstrapper>,
    seeder: Option<Arc<dyn Seeder>>,
}

impl Migrator {
    /// Creates a migrator with an empty baseline and no seeder.
    pub fn new(adapter: Arc<dyn DialectAdapter>, registry: Registry) -> Self {
        Self {
            store: VersionStore::new(adapter.clone()),
            adapter,
            registry,
            bootstrapper: Arc::new(EmptyBaseline),
            seeder: None,
        }
    }

    /// Sets the baseline used on first run.
    pub fn with_bootstrapper(mut self, bootstrapper: impl Bootstrapper + 'static) -> Self {
        self.bootstrapper = Arc::new(bootstrapper);
        self
    }

    /// Sets the seeder invoked on first run and exposed to migration bodies.
    pub fn with_seeder(mut self, seeder: impl Seeder + 'static) -> Self {
        self.seeder = Some(Arc::new(seeder));
        self
    }

    /// The registry this migrator applies.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The Version Store this migrator records into.
    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    fn context(&self) -> MigrationContext<'_> {
        MigrationContext::new(self.adapter.as_ref(), self.seeder.as_deref())
    }

    /// Runs all pending migrations.
    ///
    /// On an empty Version Store the baseline is bootstrapped and the seeder
    /// runs before any migration is applied.
    pub async fn migrate(&self) -> Result<RunResult, MigrationError> {
        self.store.ensure_exists().await?;

        let applied = self.store.list_applied().await?;
        self.check_known(&applied)?;

        let was_first_run = applied.is_empty();
        let previous_version = applied.last().map(|r| r.version);
        let applied_set: HashSet<Version> = applied.iter().map(|r| r.version).collect();

        if was_first_run {
            self.bootstrap().await?;
        }

        let ctx = self.context();
        let mut applied_versions = Vec::new();

        for migration in self.registry.iter() {
            let version = migration.version();
            if applied_set.contains(&version) {
                log::debug!(
                    "Skipping migration {} ({}): already applied",
                    version,
                    migration.name()
                );
                continue;
            }

            if was_first_run && self.bootstrapper.covers(version) {
                log::info!(
                    "Migration {} ({}) is part of the baseline, recording only",
                    version,
                    migration.name()
                );
            } else {
                log::info!(
                    "Running migration {} ({}): {}",
                    version,
                    migration.name(),
                    migration.description()
                );
                if let Err(e) = migration.up(&ctx).await {
                    let err = e.attribute(version, migration.name(), self.adapter.dialect());
                    log::error!("Migration {} ({}) failed: {}", version, migration.name(), err);
                    return Err(err);
                }
            }

            if let Err(err) = self.store.record(migration).await {
                log::error!("Recording migration {} failed: {}", version, err);
                return Err(err);
            }

            log::info!(
                "Migration {} ({}) applied successfully",
                version,
                migration.name()
            );
            applied_versions.push(version);
        }

        let current_version = applied_versions.last().copied().or(previous_version);

        Ok(RunResult {
            was_first_run,
            applied_versions,
            current_version,
            previous_version,
        })
    }

    async fn bootstrap(&self) -> Result<(), MigrationError> {
        log::info!(
            "Empty version store, bootstrapping baseline schema on {}",
            self.adapter.dialect()
        );
        self.bootstrapper
            .bootstrap(self.adapter.as_ref())
            .await
            .map_err(MigrationError::Bootstrap)?;

        if let Some(seeder) = &self.seeder {
            let permissions = seeder
                .seed_permissions(self.adapter.as_ref())
                .await
                .map_err(MigrationError::Seed)?;
            let roles = seeder
                .seed_roles(self.adapter.as_ref(), &permissions)
                .await
                .map_err(MigrationError::Seed)?;
            log::info!(
                "Seeded {} permissions and {} roles",
                permissions.len(),
                roles.len()
            );
        }
        Ok(())
    }

    fn check_known(&self, applied: &[AppliedMigrationRecord]) -> Result<(), MigrationError> {
        match applied
            .iter()
            .find(|record| self.registry.get(record.version).is_none())
        {
            Some(record) => Err(MigrationError::UnknownVersion {
                version: record.version,
            }),
            None => Ok(()),
        }
    }

    /// Reports current, target and pending versions without applying anything.
    pub async fn status(&self) -> Result<MigrationStatus, MigrationError> {
        self.store.ensure_exists().await?;
        let applied = self.store.list_applied().await?;

        let applied_set: HashSet<Version> = applied.iter().map(|r| r.version).collect();
        let pending_versions = self
            .registry
            .iter()
            .map(|m| m.version())
            .filter(|v| !applied_set.contains(v))
            .collect();

        Ok(MigrationStatus {
            current_version: applied.last().map(|r| r.version),
            target_version: self.registry.target_version(),
            pending_versions,
            applied,
        })
    }

    /// Returns the highest recorded version, `None` when nothing is recorded.
    pub async fn current_version(&self) -> Result<Option<Version>, MigrationError> {
        self.store.current_version().await
    }

    /// True when the Version Store has no records.
    pub async fn is_first_run(&self) -> Result<bool, MigrationError> {
        Ok(self.store.list_applied().await?.is_empty())
    }

    /// Returns the migrations not yet recorded, in Registry order.
    pub async fn pending(&self) -> Result<Vec<&dyn Migration>, MigrationError> {
        let applied_set: HashSet<Version> = self
            .store
            .list_applied()
            .await?
            .iter()
            .map(|r| r.version)
            .collect();

        Ok(self
            .registry
            .iter()
            .filter(|m| !applied_set.contains(&m.version()))
            .collect())
    }

    /// Runs the reverse action of the most recently recorded migration and
    /// removes its record.
    ///
    /// This is an operator action outside normal `migrate()` operation.
    /// Returns `None` when nothing is recorded.
    pub async fn revert_last(&self) -> Result<Option<Version>, MigrationError> {
        let Some(last) = self.store.list_applied().await?.pop() else {
            return Ok(None);
        };
        let migration = self
            .registry
            .get(last.version)
            .ok_or(MigrationError::UnknownVersion {
                version: last.version,
            })?;

        if !migration.reversible() {
            return Err(MigrationError::Irreversible {
                version: last.version,
                name: migration.name().to_string(),
            });
        }

        log::info!("Reverting migration {} ({})", last.version, migration.name());
        migration
            .down(&self.context())
            .await
            .map_err(|e| e.attribute(last.version, migration.name(), self.adapter.dialect()))?;
        self.store.remove(last.version).await?;

        Ok(Some(last.version))
    }
}

impl std::fmt::Debug for Migrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("dialect", &self.adapter.dialect())
            .field("registry", &self.registry)
            .field("seeder", &self.seeder.as_ref().map(|_| "Some(<seeder>)"))
            .finish()
    }
}
