//! Error type shared by builders, the mapping engine and connection providers.
//!
//! Three families are distinguished:
//!
//! - construction errors (shape, filter, unmapped column, stage, empty dataset) are
//!   raised while a statement is being built and never reach the database
//! - execution errors come from the connection provider and are carried unchanged
//! - coercion errors are raised while a result row is written into a record

use crate::query::Stage;
use std::fmt;

/// Error returned by every fallible tagsql operation
#[derive(Debug)]
pub enum Error {
    /// No record instance was supplied to marshal
    EmptyDataset,
    /// A requested column has no field annotated with it under the active key
    UnmappedColumn { column: String, key: String },
    /// Insert built with records but without any column
    MissingColumns { operation: &'static str },
    /// Update built without any `set` column
    MissingSetColumns,
    /// Update or delete built with an empty or whitespace-only filter
    MissingFilter { operation: &'static str },
    /// Update or delete executed before its parameters were supplied
    MissingParams { operation: &'static str },
    /// A refinement was called on a select built from raw SQL
    RawMode { operation: &'static str },
    /// A refinement was called after a later build stage was entered
    IllegalStage { operation: &'static str, stage: Stage },
    /// A raw result value cannot be assigned to the declared field type
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },
    /// A raw byte-sequence could not be parsed into the declared field type
    Conversion {
        column: String,
        target: &'static str,
        reason: String,
    },
    /// A provider produced a row whose value count differs from its column count
    RowShape { columns: usize, values: usize },
    /// The provider did not report a generated identifier
    NoLastInsertId,
    /// A parameter could not be bound by the provider
    Parameter { index: usize, reason: String },
    /// No datasource has been registered
    NoDatasource,
    /// The named datasource is not registered
    InvalidDatasource(String),
    /// Connection string failed validation
    InvalidConnectionString(String),
    /// Connection pool failure (closed pool, failed health probe)
    Pool(String),
    /// SQLite error from `rusqlite`
    Database(rusqlite::Error),
    /// Error raised by any other connection provider
    Provider(Box<dyn std::error::Error + Send + Sync>),
    /// Configuration loading error
    Config(config::ConfigError),
}

impl Error {
    /// Whether this error was raised while building a statement
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Error::EmptyDataset
                | Error::UnmappedColumn { .. }
                | Error::MissingColumns { .. }
                | Error::MissingSetColumns
                | Error::MissingFilter { .. }
                | Error::MissingParams { .. }
                | Error::RawMode { .. }
                | Error::IllegalStage { .. }
        )
    }

    /// Whether this error was raised while writing a result row into a record
    pub fn is_coercion(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. } | Error::Conversion { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyDataset => write!(f, "empty dataset"),
            Error::UnmappedColumn { column, key } => {
                write!(f, "can not find field with tag({key}) '{column}'")
            }
            Error::MissingColumns { operation } => write!(f, "no columns to {operation}"),
            Error::MissingSetColumns => write!(f, "no [set] columns to update"),
            Error::MissingFilter { operation } => write!(
                f,
                "can't {operation} without [where] parameter. to {operation} all dataset, pass \"1=1\" as the filter"
            ),
            Error::MissingParams { operation } => {
                write!(f, "{operation} failed to build because no params were passed")
            }
            Error::RawMode { operation } => {
                write!(f, "can not use {operation} on a select built from raw sql")
            }
            Error::IllegalStage {
                operation: "limit",
                stage: Stage::Paginated,
            } => write!(f, "limit can only be applied once per select"),
            Error::IllegalStage { operation, stage } => {
                write!(f, "can not use {operation} after {stage}")
            }
            Error::TypeMismatch {
                column,
                expected,
                actual,
            } => write!(
                f,
                "column '{column}': {actual} value can not be converted to {expected}"
            ),
            Error::Conversion {
                column,
                target,
                reason,
            } => write!(
                f,
                "column '{column}': convert value from bytes to {target} error: {reason}"
            ),
            Error::RowShape { columns, values } => {
                write!(f, "row has {values} values for {columns} columns")
            }
            Error::NoLastInsertId => write!(f, "driver did not report a last insert id"),
            Error::Parameter { index, reason } => {
                write!(f, "can not bind parameter {index}: {reason}")
            }
            Error::NoDatasource => write!(f, "no datasource registered"),
            Error::InvalidDatasource(name) => write!(f, "invalid datasource {name}"),
            Error::InvalidConnectionString(s) => write!(f, "Invalid connection string: {s}"),
            Error::Pool(s) => write!(f, "Pool error: {s}"),
            Error::Database(e) => write!(f, "SQLite error: {e}"),
            Error::Provider(e) => write!(f, "Provider error: {e}"),
            Error::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Database(e) => Some(e),
            Error::Provider(e) => Some(e.as_ref()),
            Error::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_column_names_key() {
        let err = Error::UnmappedColumn {
            column: "email".to_string(),
            key: "db".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("tag(db)"));
        assert!(display.contains("'email'"));
    }

    #[test]
    fn test_error_families() {
        assert!(Error::EmptyDataset.is_construction());
        assert!(Error::MissingFilter { operation: "delete" }.is_construction());
        assert!(Error::IllegalStage {
            operation: "order_by_asc",
            stage: Stage::Paginated,
        }
        .is_construction());
        assert!(!Error::NoDatasource.is_construction());

        let mismatch = Error::TypeMismatch {
            column: "name".to_string(),
            expected: "String",
            actual: "i64",
        };
        assert!(mismatch.is_coercion());
        assert!(!mismatch.is_construction());
    }

    #[test]
    fn test_stage_error_display() {
        let err = Error::IllegalStage {
            operation: "order_by_desc",
            stage: Stage::Paginated,
        };
        assert_eq!(err.to_string(), "can not use order_by_desc after limit");
    }

    #[test]
    fn test_repeated_limit_display() {
        let err = Error::IllegalStage {
            operation: "limit",
            stage: Stage::Paginated,
        };
        assert_eq!(err.to_string(), "limit can only be applied once per select");
    }

    #[test]
    fn test_provider_error_source() {
        use std::error::Error as _;

        let err = Error::Provider("connection reset".into());
        assert!(err.to_string().contains("connection reset"));
        assert!(err.source().is_some());
    }
}
