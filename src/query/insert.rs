use super::{placeholders, Scope, Statement};
use crate::error::Error;
use crate::record::{marshal, Descriptor, IntoRecords};
use crate::value::Value;

/// Multi-row insert builder
///
/// Builds `insert into <table> (c1,c2) values (?,?),(?,?)` with one placeholder
/// group per record. Parameters come from marshaling every record with the
/// column list.
pub struct Insert<'h> {
    scope: Scope<'h>,
    sql: String,
    params: Vec<Value>,
    err: Option<Error>,
    last_insert_id: bool,
}

impl<'h> Insert<'h> {
    pub(crate) fn new<'a, S: IntoRecords<'a>>(
        scope: Scope<'h>,
        table: &str,
        columns: &[&str],
        records: S,
    ) -> Self {
        let mut insert = Insert {
            scope,
            sql: String::new(),
            params: Vec::new(),
            err: None,
            last_insert_id: false,
        };

        let records = records.into_records().records();
        if records.is_empty() {
            return insert;
        }
        if columns.is_empty() {
            insert.err = Some(Error::MissingColumns {
                operation: "insert",
            });
            return insert;
        }

        let group = format!("({})", placeholders(columns.len()));
        insert.sql = format!(
            "insert into {} ({}) values {}",
            table,
            columns.join(","),
            vec![group; records.len()].join(",")
        );

        let descriptor = Descriptor::<S::Record>::of(scope.key);
        match marshal(columns, &descriptor, &records) {
            Ok(params) => insert.params = params,
            Err(err) => insert.err = Some(err),
        }
        insert
    }

    /// Make `exec` return the generated identifier instead of the affected count
    pub fn last_insert_id(mut self) -> Self {
        self.last_insert_id = true;
        self
    }

    /// The construction error, if any
    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// SQL text and parameters assembled so far
    pub fn desc(&self) -> (&str, &[Value]) {
        (&self.sql, &self.params)
    }

    pub fn build(self) -> Result<Statement<'h>, Error> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(Statement::new(self.scope, self.sql, self.params)),
        }
    }

    /// Run the insert
    ///
    /// Returns the number of inserted rows, or the generated identifier after
    /// [`last_insert_id`](Self::last_insert_id). An insert without records
    /// returns `0` without touching the database.
    pub fn exec(self) -> Result<u64, Error> {
        let last_insert_id = self.last_insert_id;
        let statement = self.build()?;
        if statement.params().is_empty() {
            return Ok(0);
        }

        let outcome = statement.execute()?;
        if last_insert_id {
            outcome.last_insert_id.ok_or(Error::NoLastInsertId)
        } else {
            Ok(outcome.rows_affected)
        }
    }
}
