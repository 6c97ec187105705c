use super::{Scope, Statement};
use crate::error::Error;
use crate::record::{marshal, Descriptor, Element};
use crate::value::Value;

/// Update builder: `update <table> set c1=?,c2=? where <filter>`
///
/// The filter is mandatory; pass `"1=1"` to update every row on purpose.
/// Parameters must be supplied with [`params`](Self::params) or
/// [`params_from`](Self::params_from) before [`exec`](Self::exec).
pub struct Update<'h> {
    scope: Scope<'h>,
    sql: String,
    set_columns: Vec<String>,
    params: Option<Vec<Value>>,
    err: Option<Error>,
}

impl<'h> Update<'h> {
    pub(crate) fn new(scope: Scope<'h>, table: &str, set_columns: &[&str], filter: &str) -> Self {
        let mut update = Update {
            scope,
            sql: String::new(),
            set_columns: set_columns.iter().map(|c| c.to_string()).collect(),
            params: None,
            err: None,
        };

        let filter = filter.trim();
        if set_columns.is_empty() {
            update.err = Some(Error::MissingSetColumns);
        } else if filter.is_empty() {
            update.err = Some(Error::MissingFilter {
                operation: "update",
            });
        } else {
            let assignments: Vec<String> =
                set_columns.iter().map(|column| format!("{column}=?")).collect();
            update.sql = format!(
                "update {} set {} where {}",
                table,
                assignments.join(","),
                filter
            );
        }
        update
    }

    /// Supply the parameters directly: set values first, then filter values
    pub fn params(mut self, params: Vec<Value>) -> Self {
        if self.err.is_none() {
            self.params = Some(params);
        }
        self
    }

    /// Marshal the parameters from a record
    ///
    /// Reads the set columns followed by `where_columns`. The where columns must
    /// appear in the same order as their `?` placeholders in the filter; that
    /// alignment is not checked.
    pub fn params_from<E: Element>(mut self, record: &E, where_columns: &[&str]) -> Self {
        if self.err.is_some() {
            return self;
        }

        let columns: Vec<&str> = self
            .set_columns
            .iter()
            .map(String::as_str)
            .chain(where_columns.iter().copied())
            .collect();
        let descriptor = Descriptor::<E::Record>::of(self.scope.key);
        match marshal(&columns, &descriptor, &[record.as_record()]) {
            Ok(params) => self.params = Some(params),
            Err(err) => self.err = Some(err),
        }
        self
    }

    pub fn error(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    pub fn desc(&self) -> (&str, &[Value]) {
        (&self.sql, self.params.as_deref().unwrap_or_default())
    }

    pub fn build(self) -> Result<Statement<'h>, Error> {
        if let Some(err) = self.err {
            return Err(err);
        }
        let params = self.params.ok_or(Error::MissingParams {
            operation: "update",
        })?;
        Ok(Statement::new(self.scope, self.sql, params))
    }

    /// Run the update and return the number of affected rows
    pub fn exec(self) -> Result<u64, Error> {
        Ok(self.build()?.execute()?.rows_affected)
    }
}
