//! Statement builders
//!
//! Each builder accumulates SQL text, positional parameters and a construction
//! error. Once an error is recorded every further chained call is a no-op, and
//! `build` / `exec` / `fetch` return the stored error without touching the
//! database. [`Statement`] is the success state that actually runs.

mod delete;
mod insert;
mod select;
mod statement;
mod update;

pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use statement::Statement;
pub use update::Update;

use crate::error::Error;
use crate::executor::{Connection, Session, TransactionHandle};
use std::fmt;

/// Position of a select builder in its refinement sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Base,
    Grouped,
    Ordered,
    Paginated,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Base => "select",
            Stage::Grouped => "group by",
            Stage::Ordered => "order by",
            Stage::Paginated => "limit",
        };
        f.write_str(name)
    }
}

/// The handle a statement runs against: shared connection or open transaction
#[derive(Clone, Copy)]
pub(crate) enum Handle<'h> {
    Shared(&'h dyn Connection),
    Transaction(&'h dyn TransactionHandle),
}

impl<'h> Handle<'h> {
    pub(crate) fn acquire(&self) -> Result<Box<dyn Session + 'h>, Error> {
        match *self {
            Handle::Shared(connection) => connection.acquire(),
            Handle::Transaction(transaction) => transaction.acquire(),
        }
    }
}

/// What every builder is bound to: a handle plus the annotation key for records
#[derive(Clone, Copy)]
pub(crate) struct Scope<'h> {
    pub(crate) handle: Handle<'h>,
    pub(crate) key: &'h str,
}

/// `?,?,?` for `count` placeholders
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}
