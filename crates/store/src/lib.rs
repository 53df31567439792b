//! Database access shim over an embedded SQLite store.
//!
//! Statements use `$name` placeholders bound from [`Params`]. Reads come back
//! as JSON-keyed [`Row`]s that callers decode with serde. Mutations that need
//! the affected row go through [`Database::query_returning`], keyed by a
//! [`Returning`] declaration.

pub mod analyzer;
pub mod database;
pub mod error;
pub mod params;
pub mod returning;
pub mod row;
mod statement;

pub use analyzer::{QueryAnalyzer, QueryStats};
pub use database::{Database, DatabaseOptions, DbTransaction, QueryOutcome};
pub use error::{Result, StoreError};
pub use params::{Param, Params};
pub use returning::Returning;
pub use row::Row;
