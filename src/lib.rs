//! # tagsql
//!
//! Annotation-driven SQL statement builders and row mapping.
//!
//! Record fields carry column annotations (`#[column("name")]`); tagsql uses
//! them to turn records into positional parameters and result rows back into
//! records. Statements are written in plain SQL with `?` placeholders and run
//! against any [`Connection`] provider; a pooled SQLite provider is bundled.
//!
//! - [`Database`] / [`Context`]: datasource registry and statement factory
//! - [`Insert`], [`Update`], [`Delete`], [`Select`]: statement builders
//! - [`Transaction`]: the same builders inside one transaction
//! - [`Record`]: derived field table of a record type
//!
//! Features: `tracing` (default) wraps statements and transactions in spans,
//! `metrics` records OpenTelemetry statement counters, `mock` exposes
//! [`testing::MockConnection`] outside of this crate's tests.

extern crate self as tagsql;

pub mod config;
pub mod connection;
mod context;
pub mod error;
pub mod executor;
mod macros;
pub mod metrics;
pub mod pool;
pub mod query;
pub mod record;
mod transaction;
pub mod value;

#[cfg(any(test, feature = "mock"))]
pub mod testing;

pub use config::{DatasourceConfig, OrmConfig};
pub use context::{Context, Database, DatabaseBuilder, DEFAULT_ANNOTATION_KEY};
pub use error::Error;
pub use executor::{
    Connection, ExecOutcome, Executor, PreparedStatement, RowCursor, Session, TransactionHandle,
};
pub use pool::SqlitePool;
pub use query::{Delete, Insert, Select, Stage, Statement, Update};
pub use record::{columns_except, Descriptor, Element, Field, IntoRecords, Record, ResultTarget};
pub use transaction::Transaction;
pub use value::{FieldKind, FieldValue, Value};

pub use tagsql_derive::Record;

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
