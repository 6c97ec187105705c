//! Connection Provider contract
//!
//! tagsql never talks to a database directly. Statements run against the traits
//! in this module, which a provider implements for its own driver:
//!
//! - [`Connection`]: a shared handle (usually a pool) that can run statements and
//!   begin transactions; safe to use from many threads at once
//! - [`TransactionHandle`]: an open transaction; used by one caller at a time
//! - [`Session`]: a connection checked out for the duration of one statement
//! - [`PreparedStatement`] and [`RowCursor`]: the per-call prepared statement and
//!   its result rows
//!
//! Every resource is released by `Drop`, so a statement that fails halfway
//! still returns its connection and closes its cursor.
//!
//! The SQLite provider in [`crate::pool`] is the bundled implementation.

use crate::error::Error;
use crate::value::Value;

/// Result of a statement that does not return rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Number of rows inserted, updated or deleted
    pub rows_affected: u64,
    /// Identifier generated by this statement; `None` unless it inserted rows
    /// and the driver reports one
    pub last_insert_id: Option<u64>,
}

/// Anything statements can run against
pub trait Executor {
    /// Check out a session for one statement
    ///
    /// For a pool this blocks until a connection is available. For a
    /// transaction it borrows the transaction's own connection.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if no session can be obtained.
    fn acquire(&self) -> Result<Box<dyn Session + '_>, Error>;
}

/// A connection checked out for one statement
pub trait Session {
    /// Prepare `sql`; placeholders are positional `?`
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged if the statement cannot be prepared.
    fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, Error>;
}

/// A prepared statement, closed when dropped
pub trait PreparedStatement {
    /// Run a statement that does not return rows
    fn execute(&mut self, params: &[Value]) -> Result<ExecOutcome, Error>;

    /// Run a query and iterate its rows
    fn query(&mut self, params: &[Value]) -> Result<Box<dyn RowCursor + '_>, Error>;
}

/// Rows of a query, closed when dropped
pub trait RowCursor {
    /// Column names of the result set, in result order
    fn columns(&self) -> &[String];

    /// Next row as raw values, one per column; `None` once exhausted
    fn next_row(&mut self) -> Result<Option<Vec<Value>>, Error>;
}

/// A shared connection handle
pub trait Connection: Executor + Send + Sync {
    /// Begin a transaction
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged if the transaction cannot be started.
    fn begin(&self) -> Result<Box<dyn TransactionHandle + '_>, Error>;
}

/// An open transaction
///
/// Not `Sync`: statements of one transaction run sequentially on one thread.
/// A handle dropped without `commit` or `rollback` must roll back.
pub trait TransactionHandle: Executor {
    fn commit(self: Box<Self>) -> Result<(), Error>;

    fn rollback(self: Box<Self>) -> Result<(), Error>;
}
