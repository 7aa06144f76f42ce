//! # Strata sqlite adapter
//!
//! [`DialectAdapter`](strata_core::DialectAdapter) for the embedded SQLite
//! engine. Column alterations the engine cannot do in place are emulated
//! by rebuilding the table through a shadow copy.

#![deny(missing_docs)]

/// The sqlite dialect adapter
pub mod adapter;

mod ddl;
mod error;
mod rebuild;
mod row;

pub use adapter::SqliteAdapter;
pub use rebuild::SHADOW_PREFIX;
