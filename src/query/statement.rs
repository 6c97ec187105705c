use super::Scope;
use crate::error::Error;
use crate::executor::ExecOutcome;
use crate::record::{unmarshal, Descriptor, ResultTarget};
use crate::value::Value;
use std::time::Instant;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// A fully built statement, bound to its handle
///
/// Every run acquires a session, prepares the SQL text, runs it and releases
/// the prepared statement, cursor and session before returning, on error paths
/// too. Nothing is cached between runs.
pub struct Statement<'h> {
    scope: Scope<'h>,
    sql: String,
    params: Vec<Value>,
}

impl<'h> Statement<'h> {
    pub(crate) fn new(scope: Scope<'h>, sql: String, params: Vec<Value>) -> Self {
        Statement { scope, sql, params }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Run a statement that returns no rows
    pub fn execute(&self) -> Result<ExecOutcome, Error> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_statement_span(&self.sql).entered();

        log::debug!("execute: {} ({} params)", self.sql, self.params.len());
        let start = Instant::now();
        let result = self.run_execute();

        #[cfg(feature = "metrics")]
        METRICS.record_statement("exec", start.elapsed(), result.is_ok());

        match &result {
            Ok(outcome) => log::debug!(
                "execute: {} rows affected in {:?}",
                outcome.rows_affected,
                start.elapsed()
            ),
            Err(err) => log::debug!("execute failed: {err}"),
        }
        result
    }

    /// Run a query, decoding every row into `target` in result order
    ///
    /// A coercion error stops the iteration; rows decoded before it stay in
    /// the target. Returns the number of rows decoded.
    pub fn query<T: ResultTarget>(&self, target: &mut T) -> Result<usize, Error> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::query_statement_span(&self.sql).entered();

        log::debug!("query: {} ({} params)", self.sql, self.params.len());
        let start = Instant::now();
        let result = self.run_query(target);

        #[cfg(feature = "metrics")]
        METRICS.record_statement("query", start.elapsed(), result.is_ok());

        match &result {
            Ok(rows) => log::debug!("query: {rows} rows in {:?}", start.elapsed()),
            Err(err) => log::debug!("query failed: {err}"),
        }
        result
    }

    fn run_execute(&self) -> Result<ExecOutcome, Error> {
        let session = self.scope.handle.acquire()?;
        let mut prepared = session.prepare(&self.sql)?;
        let outcome = prepared.execute(&self.params)?;
        Ok(outcome)
    }

    fn run_query<T: ResultTarget>(&self, target: &mut T) -> Result<usize, Error> {
        let descriptor = Descriptor::<T::Record>::of(self.scope.key);
        let session = self.scope.handle.acquire()?;
        let mut prepared = session.prepare(&self.sql)?;
        let mut rows = prepared.query(&self.params)?;
        let columns = rows.columns().to_vec();

        let mut count = 0;
        while let Some(raw) = rows.next_row()? {
            unmarshal(&columns, raw, &descriptor, target)?;
            count += 1;
        }
        Ok(count)
    }
}
