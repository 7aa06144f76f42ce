//! Baseline schema creation for fresh stores.

use async_trait::async_trait;

use crate::adapter::{AdapterError, DialectAdapter};
use crate::version::Version;

/// Creates the complete baseline schema of a fresh database in one pass.
///
/// The runner calls [`bootstrap`](Self::bootstrap) only when the Version
/// Store is empty. Implementations create referenced tables before the
/// tables that reference them and go through the adapter exclusively.
#[async_trait]
pub trait Bootstrapper: Send + Sync {
    /// Creates every baseline table and index.
    async fn bootstrap(&self, adapter: &dyn DialectAdapter) -> Result<(), AdapterError>;

    /// True when the baseline already contains the effect of `version`.
    ///
    /// Covered migrations are recorded on the first run without executing
    /// their forward action.
    fn covers(&self, _version: Version) -> bool {
        false
    }
}

/// A bootstrapper that creates nothing.
///
/// Every migration then runs on the first run, starting from an empty
/// database.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBaseline;

#[async_trait]
impl Bootstrapper for EmptyBaseline {
    async fn bootstrap(&self, _adapter: &dyn DialectAdapter) -> Result<(), AdapterError> {
        Ok(())
    }
}
