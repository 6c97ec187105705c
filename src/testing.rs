//! In-memory connection provider for tests
//!
//! [`MockConnection`] records every prepared SQL text and every parameter list
//! it is asked to run, and answers with queued outcomes and result sets. Clones
//! share their state, so a test can register one clone with a
//! [`Database`](crate::Database) and inspect the other.

use crate::error::Error;
use crate::executor::{
    Connection, ExecOutcome, Executor, PreparedStatement, RowCursor, Session, TransactionHandle,
};
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct MockState {
    prepared: Vec<String>,
    executed: Vec<(String, Vec<Value>)>,
    outcomes: VecDeque<ExecOutcome>,
    results: VecDeque<(Vec<String>, Vec<Vec<Value>>)>,
    fail_prepare: Option<String>,
    begins: usize,
    commits: usize,
    rollbacks: usize,
}

/// A scripted [`Connection`]
#[derive(Clone, Default)]
pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }

    /// Queue the outcome of the next `execute`; unqueued executes affect 0 rows
    pub fn push_outcome(&self, outcome: ExecOutcome) {
        self.state().outcomes.push_back(outcome);
    }

    /// Queue the result set of the next `query`; unqueued queries return no rows
    pub fn push_rows(&self, columns: &[&str], rows: Vec<Vec<Value>>) {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        self.state().results.push_back((columns, rows));
    }

    /// Make every following `prepare` fail with `message`
    pub fn fail_prepare(&self, message: &str) {
        self.state().fail_prepare = Some(message.to_string());
    }

    pub fn prepare_count(&self) -> usize {
        self.state().prepared.len()
    }

    /// Every SQL text passed to `prepare`, in call order
    pub fn prepared(&self) -> Vec<String> {
        self.state().prepared.clone()
    }

    /// Every `(sql, params)` that was executed or queried, in call order
    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.state().executed.clone()
    }

    pub fn begins(&self) -> usize {
        self.state().begins
    }

    pub fn commits(&self) -> usize {
        self.state().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.state().rollbacks
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

struct MockSession<'a> {
    state: &'a Mutex<MockState>,
}

impl Session for MockSession<'_> {
    fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, Error> {
        let mut state = lock(self.state);
        state.prepared.push(sql.to_string());
        if let Some(message) = &state.fail_prepare {
            return Err(Error::Provider(message.clone().into()));
        }
        Ok(Box::new(MockStatement {
            state: self.state,
            sql: sql.to_string(),
        }))
    }
}

struct MockStatement<'a> {
    state: &'a Mutex<MockState>,
    sql: String,
}

impl PreparedStatement for MockStatement<'_> {
    fn execute(&mut self, params: &[Value]) -> Result<ExecOutcome, Error> {
        let mut state = lock(self.state);
        state.executed.push((self.sql.clone(), params.to_vec()));
        Ok(state.outcomes.pop_front().unwrap_or_default())
    }

    fn query(&mut self, params: &[Value]) -> Result<Box<dyn RowCursor + '_>, Error> {
        let mut state = lock(self.state);
        state.executed.push((self.sql.clone(), params.to_vec()));
        let (columns, rows) = state.results.pop_front().unwrap_or_default();
        Ok(Box::new(MockRows {
            columns,
            rows: rows.into(),
        }))
    }
}

struct MockRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
}

impl RowCursor for MockRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>, Error> {
        Ok(self.rows.pop_front())
    }
}

impl Executor for MockConnection {
    fn acquire(&self) -> Result<Box<dyn Session + '_>, Error> {
        Ok(Box::new(MockSession { state: &*self.state }))
    }
}

impl Connection for MockConnection {
    fn begin(&self) -> Result<Box<dyn TransactionHandle + '_>, Error> {
        self.state().begins += 1;
        Ok(Box::new(MockTransaction {
            state: &*self.state,
            finished: false,
        }))
    }
}

/// Transaction handle of a [`MockConnection`]; rolls back when dropped open
pub struct MockTransaction<'a> {
    state: &'a Mutex<MockState>,
    finished: bool,
}

impl Executor for MockTransaction<'_> {
    fn acquire(&self) -> Result<Box<dyn Session + '_>, Error> {
        Ok(Box::new(MockSession { state: self.state }))
    }
}

impl TransactionHandle for MockTransaction<'_> {
    fn commit(mut self: Box<Self>) -> Result<(), Error> {
        lock(self.state).commits += 1;
        self.finished = true;
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> Result<(), Error> {
        lock(self.state).rollbacks += 1;
        self.finished = true;
        Ok(())
    }
}

impl Drop for MockTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            lock(self.state).rollbacks += 1;
        }
    }
}
