use super::{Scope, Statement};
use crate::error::Error;
use crate::record::{marshal, Descriptor, Element};
use crate::value::Value;

/// Delete builder: `delete from <table> where <filter>`
///
/// Like [`Update`](super::Update), the filter is mandatory and parameters must
/// be supplied before [`exec`](Self::exec).
pub struct Delete<'h> {
    scope: Scope<'h>,
    sql: String,
    params: Option<Vec<Value>>,
    err: Option<Error>,
}

impl<'h> Delete<'h> {
    pub(crate) fn new(scope: Scope<'h>, table: &str, filter: &str) -> Self {
        let filter = filter.trim();
        if filter.is_empty() {
            return Delete {
                scope,
                sql: String::new(),
                params: None,
                err: Some(Error::MissingFilter {
                    operation: "delete",
                }),
            };
        }
        Delete {
            scope,
            sql: format!("delete from {table} where {filter}"),
            params: None,
            err: None,
        }
    }

    pub fn params(mut self, params: Vec<Value>) -> Self {
        if self.err.is_none() {
            self.params = Some(params);
        }
        self
    }

    /// Marshal the filter parameters from a record, in `where_columns` order
    ///
    /// An empty column list supplies an empty parameter list.
    pub fn params_from<E: Element>(mut self, record: &E, where_columns: &[&str]) -> Self {
        if self.err.is_some() {
            return self;
        }
        if where_columns.is_empty() {
            self.params = Some(Vec::new());
            return self;
        }

        let descriptor = Descriptor::<E::Record>::of(self.scope.key);
        match marshal(where_columns, &descriptor, &[record.as_record()]) {
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
            operation: "delete",
        })?;
        Ok(Statement::new(self.scope, self.sql, params))
    }

    /// Run the delete and return the number of affected rows
    pub fn exec(self) -> Result<u64, Error> {
        Ok(self.build()?.execute()?.rows_affected)
    }
}
