//! Transaction scope
//!
//! A [`Transaction`] exposes the same builder factories as a
//! [`Context`](crate::Context), bound to one open transaction handle. Statements
//! of a transaction run sequentially on the thread that owns it.
//!
//! Dropping a transaction without calling [`commit`](Transaction::commit) or
//! [`rollback`](Transaction::rollback) rolls it back.

use crate::error::Error;
use crate::executor::TransactionHandle;
use crate::query::{Delete, Handle, Insert, Scope, Select, Update};
use crate::record::IntoRecords;
use crate::value::Value;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// An open transaction
pub struct Transaction<'h> {
    handle: Box<dyn TransactionHandle + 'h>,
    key: &'h str,
}

impl<'h> Transaction<'h> {
    pub(crate) fn new(handle: Box<dyn TransactionHandle + 'h>, key: &'h str) -> Self {
        Transaction { handle, key }
    }

    fn scope(&self) -> Scope<'_> {
        Scope {
            handle: Handle::Transaction(&*self.handle),
            key: self.key,
        }
    }

    pub fn insert<'a, S: IntoRecords<'a>>(
        &self,
        table: &str,
        columns: &[&str],
        records: S,
    ) -> Insert<'_> {
        Insert::new(self.scope(), table, columns, records)
    }

    pub fn update(&self, table: &str, set_columns: &[&str], filter: &str) -> Update<'_> {
        Update::new(self.scope(), table, set_columns, filter)
    }

    pub fn delete(&self, table: &str, filter: &str) -> Delete<'_> {
        Delete::new(self.scope(), table, filter)
    }

    pub fn select(
        &self,
        table: &str,
        columns: &[&str],
        filter: &str,
        params: Vec<Value>,
    ) -> Select<'_> {
        Select::new(self.scope(), table, columns, filter, params)
    }

    /// Select from raw SQL; refinements are rejected
    pub fn search(&self, sql: &str, params: Vec<Value>) -> Select<'_> {
        Select::raw(self.scope(), sql, params)
    }

    /// Commit every statement run in this transaction
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged if the commit fails.
    pub fn commit(self) -> Result<(), Error> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::commit_transaction_span().entered();

        log::debug!("commit transaction");
        self.handle.commit()
    }

    /// Discard every statement run in this transaction
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged if the rollback fails.
    pub fn rollback(self) -> Result<(), Error> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::rollback_transaction_span().entered();

        log::debug!("rollback transaction");
        self.handle.rollback()
    }
}
