//! # Strata postgres adapter
//!
//! [`DialectAdapter`](strata_core::DialectAdapter) for PostgreSQL. Every
//! column alteration runs natively, inside a transaction.

#![deny(missing_docs)]

/// The postgres dialect adapter
pub mod adapter;

mod alter;
mod ddl;
mod error;
mod row;

pub use adapter::PgAdapter;
