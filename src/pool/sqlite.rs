//! `rusqlite` implementations of the provider traits
//!
//! Result values are reported the way wire drivers report them: TEXT and BLOB
//! columns become byte-sequences, INTEGER becomes `I64`, REAL becomes `F64`.
//! Columns declared as DATETIME, TIMESTAMP or DATE whose text parses as a
//! timestamp become `Timestamp`.

use super::manager::PooledConnection;
use crate::error::Error;
use crate::executor::{ExecOutcome, Executor, PreparedStatement, RowCursor, Session, TransactionHandle};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::types::{Value as SqlValue, ValueRef};

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

impl Session for PooledConnection<'_> {
    fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, Error> {
        let conn = self.get()?;
        let stmt = conn.prepare(sql)?;
        Ok(Box::new(SqliteStatement {
            conn,
            stmt,
            inserts: is_insert(sql),
        }))
    }
}

impl<S: Session + ?Sized> Session for &S {
    fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement + '_>, Error> {
        (**self).prepare(sql)
    }
}

struct SqliteStatement<'c> {
    conn: &'c rusqlite::Connection,
    stmt: rusqlite::Statement<'c>,
    inserts: bool,
}

impl PreparedStatement for SqliteStatement<'_> {
    fn execute(&mut self, params: &[Value]) -> Result<ExecOutcome, Error> {
        let params = to_sql_values(params)?;
        let affected = self.stmt.execute(rusqlite::params_from_iter(params))?;
        // the connection keeps the rowid of its last insert across other statements
        let last_insert_id =
            (self.inserts && affected > 0).then(|| self.conn.last_insert_rowid() as u64);
        Ok(ExecOutcome {
            rows_affected: affected as u64,
            last_insert_id,
        })
    }

    fn query(&mut self, params: &[Value]) -> Result<Box<dyn RowCursor + '_>, Error> {
        let params = to_sql_values(params)?;
        let columns: Vec<String> = self
            .stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let temporal: Vec<bool> = self
            .stmt
            .columns()
            .iter()
            .map(|column| column.decl_type().is_some_and(is_temporal_decl))
            .collect();
        let rows = self.stmt.query(rusqlite::params_from_iter(params))?;
        Ok(Box::new(SqliteRows {
            columns,
            temporal,
            rows,
        }))
    }
}

struct SqliteRows<'s> {
    columns: Vec<String>,
    temporal: Vec<bool>,
    rows: rusqlite::Rows<'s>,
}

impl RowCursor for SqliteRows<'_> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>, Error> {
        let Some(row) = self.rows.next()? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(self.columns.len());
        for (index, temporal) in self.temporal.iter().enumerate() {
            values.push(from_sql_value(row.get_ref(index)?, *temporal));
        }
        Ok(Some(values))
    }
}

/// A transaction on a checked-out connection
///
/// The connection goes back to the pool when the transaction ends. Dropping an
/// open transaction rolls it back.
pub struct SqliteTransaction<'p> {
    conn: PooledConnection<'p>,
    finished: bool,
}

impl<'p> SqliteTransaction<'p> {
    pub(crate) fn begin(conn: PooledConnection<'p>) -> Result<Self, Error> {
        conn.get()?.execute_batch("BEGIN")?;
        Ok(SqliteTransaction {
            conn,
            finished: false,
        })
    }

    fn finish(&mut self, sql: &str) -> Result<(), Error> {
        self.finished = true;
        self.conn.get()?.execute_batch(sql)?;
        Ok(())
    }
}

impl Executor for SqliteTransaction<'_> {
    fn acquire(&self) -> Result<Box<dyn Session + '_>, Error> {
        Ok(Box::new(&self.conn))
    }
}

impl TransactionHandle for SqliteTransaction<'_> {
    fn commit(mut self: Box<Self>) -> Result<(), Error> {
        let result = self.finish("COMMIT");
        if result.is_err() {
            // a failed COMMIT leaves the transaction open
            self.finished = false;
        }
        result
    }

    fn rollback(mut self: Box<Self>) -> Result<(), Error> {
        self.finish("ROLLBACK")
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::rollback_transaction_span().entered();

        log::warn!("transaction dropped without commit or rollback, rolling back");
        if let Err(err) = self.finish("ROLLBACK") {
            log::warn!("rollback of dropped transaction failed: {err}");
        }
    }
}

/// `insert ...` or `replace ...`, the statements that assign a rowid
fn is_insert(sql: &str) -> bool {
    let verb = sql
        .trim_start()
        .split(|c: char| c.is_whitespace())
        .next()
        .unwrap_or_default();
    verb.eq_ignore_ascii_case("insert") || verb.eq_ignore_ascii_case("replace")
}

fn is_temporal_decl(decl: &str) -> bool {
    let decl = decl.to_ascii_uppercase();
    decl.contains("DATE") || decl.contains("TIME")
}

fn to_sql_values(params: &[Value]) -> Result<Vec<SqlValue>, Error> {
    params
        .iter()
        .enumerate()
        .map(|(index, value)| to_sql_value(index, value))
        .collect()
}

fn to_sql_value(index: usize, value: &Value) -> Result<SqlValue, Error> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(v) => SqlValue::Integer(*v as i64),
        Value::I8(v) => SqlValue::Integer(*v as i64),
        Value::I16(v) => SqlValue::Integer(*v as i64),
        Value::I32(v) => SqlValue::Integer(*v as i64),
        Value::I64(v) => SqlValue::Integer(*v),
        Value::U8(v) => SqlValue::Integer(*v as i64),
        Value::U16(v) => SqlValue::Integer(*v as i64),
        Value::U32(v) => SqlValue::Integer(*v as i64),
        Value::U64(v) => SqlValue::Integer(i64::try_from(*v).map_err(|_| Error::Parameter {
            index,
            reason: format!("{v} does not fit in a SQLite integer"),
        })?),
        Value::F32(v) => SqlValue::Real(*v as f64),
        Value::F64(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Bytes(v) => SqlValue::Blob(v.clone()),
        Value::Timestamp(v) => SqlValue::Text(v.format(TIMESTAMP_FORMAT).to_string()),
    })
}

fn from_sql_value(value: ValueRef<'_>, temporal: bool) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::I64(v),
        ValueRef::Real(v) => Value::F64(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            if temporal {
                if let Some(ts) = std::str::from_utf8(bytes).ok().and_then(parse_timestamp) {
                    return Value::Timestamp(ts);
                }
            }
            Value::Bytes(bytes.to_vec())
        }
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|t| t.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
