//! The application's schema history.
//!
//! [`registry`] lists every migration in release order; [`migrator`] wires
//! it to the baseline and the access seeder.

use std::sync::Arc;
use strata_core::{DialectAdapter, Migrator, Registry};

mod baseline;
pub mod migrations;
mod seed;
pub mod tables;

pub use baseline::{AppBaseline, BASELINE_VERSION};
pub use seed::{AccessSeeder, PERMISSIONS, ROLES};

/// Every application migration, ascending.
pub fn registry() -> Registry {
    Registry::new()
        .register(migrations::Init)
        .register(migrations::AddUserDisplayName)
        .register(migrations::CreateAuditLog)
        .register(migrations::SeedAuditorRole)
        .register(migrations::RequireUserEmail)
        .register(migrations::DropUserLegacyToken)
}

/// A migrator for the application schema over `adapter`.
pub fn migrator(adapter: Arc<dyn DialectAdapter>) -> Migrator {
    Migrator::new(adapter, registry())
        .with_bootstrapper(AppBaseline)
        .with_seeder(AccessSeeder)
}
