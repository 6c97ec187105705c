//! Datasource registry and execution context
//!
//! A [`Database`] owns the registered datasources, in registration order, and
//! the annotation key used to map record fields. The first registered
//! datasource is the default one. A [`Context`] is a cheap view bound to one
//! datasource, from which statements and transactions are created.
//!
//! # Examples
//!
//! ```no_run
//! use tagsql::{params, Database, OrmConfig, Record};
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     #[column("id")]
//!     id: i64,
//!     #[column("name")]
//!     name: String,
//! }
//!
//! # fn main() -> Result<(), tagsql::Error> {
//! let db = Database::open(&OrmConfig::load()?)?;
//! let ctx = db.context()?;
//!
//! let users = vec![User { id: 1, name: "a".into() }, User { id: 2, name: "b".into() }];
//! ctx.insert("users", &["id", "name"], &users).exec()?;
//!
//! let adults: Vec<User> = ctx
//!     .select("users", &[], "age > ?", params![30])
//!     .order_by_desc("age")
//!     .limit(0, 10)
//!     .fetch_all()?;
//! # Ok(())
//! # }
//! ```

use crate::config::OrmConfig;
use crate::error::Error;
use crate::executor::Connection;
use crate::pool::SqlitePool;
use crate::query::{Delete, Handle, Insert, Scope, Select, Update};
use crate::record::IntoRecords;
use crate::transaction::Transaction;
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Annotation key used when none is configured: `#[column("name")]`
pub const DEFAULT_ANNOTATION_KEY: &str = "column";

/// Registered datasources plus the annotation key
pub struct Database {
    datasources: IndexMap<String, Arc<dyn Connection>>,
    annotation_key: String,
}

impl Database {
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::default()
    }

    /// Open a SQLite pool for every configured datasource
    ///
    /// # Errors
    ///
    /// Fails on the first datasource whose connection string is invalid or
    /// whose first connection does not answer the health probe.
    pub fn open(config: &OrmConfig) -> Result<Self, Error> {
        let mut builder = Database::builder().annotation_key(&config.annotation_key);
        for datasource in &config.datasources {
            let pool = SqlitePool::open(datasource.clone())?;
            builder = builder.register(&datasource.name, pool);
        }
        Ok(builder.build())
    }

    /// Context bound to the default (first registered) datasource
    pub fn context(&self) -> Result<Context<'_>, Error> {
        let (name, connection) = self.datasources.first().ok_or(Error::NoDatasource)?;
        log::trace!("using default datasource {name}");
        Ok(self.bind(connection.as_ref()))
    }

    /// Context bound to the named datasource
    pub fn context_of(&self, name: &str) -> Result<Context<'_>, Error> {
        let connection = self
            .datasources
            .get(name)
            .ok_or_else(|| Error::InvalidDatasource(name.to_string()))?;
        Ok(self.bind(connection.as_ref()))
    }

    fn bind<'h>(&'h self, connection: &'h dyn Connection) -> Context<'h> {
        Context {
            connection,
            key: &self.annotation_key,
        }
    }

    pub fn annotation_key(&self) -> &str {
        &self.annotation_key
    }

    /// Datasource names in registration order; the first is the default
    pub fn datasource_names(&self) -> impl Iterator<Item = &str> {
        self.datasources.keys().map(String::as_str)
    }
}

/// Builder for a [`Database`]
pub struct DatabaseBuilder {
    datasources: IndexMap<String, Arc<dyn Connection>>,
    annotation_key: String,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        DatabaseBuilder {
            datasources: IndexMap::new(),
            annotation_key: DEFAULT_ANNOTATION_KEY.to_string(),
        }
    }
}

impl DatabaseBuilder {
    /// Annotation key whose column names map record fields
    pub fn annotation_key(mut self, key: impl Into<String>) -> Self {
        self.annotation_key = key.into();
        self
    }

    /// Register a datasource under `name`
    ///
    /// Registering a name twice replaces the earlier connection but keeps its
    /// position, so the default datasource does not change.
    pub fn register(self, name: impl Into<String>, connection: impl Connection + 'static) -> Self {
        self.register_shared(name, Arc::new(connection))
    }

    pub fn register_shared(
        mut self,
        name: impl Into<String>,
        connection: Arc<dyn Connection>,
    ) -> Self {
        let name = name.into();
        if self.datasources.insert(name.clone(), connection).is_some() {
            log::warn!("datasource {name} registered twice, replacing the earlier connection");
        } else {
            log::info!("registered datasource {name}");
        }
        self
    }

    pub fn build(self) -> Database {
        Database {
            datasources: self.datasources,
            annotation_key: self.annotation_key,
        }
    }
}

/// Statement factory bound to one datasource
#[derive(Clone, Copy)]
pub struct Context<'h> {
    connection: &'h dyn Connection,
    key: &'h str,
}

impl<'h> Context<'h> {
    fn scope(&self) -> Scope<'h> {
        Scope {
            handle: Handle::Shared(self.connection),
            key: self.key,
        }
    }

    /// Insert one or more records in a single statement
    pub fn insert<'a, S: IntoRecords<'a>>(
        &self,
        table: &str,
        columns: &[&str],
        records: S,
    ) -> Insert<'h> {
        Insert::new(self.scope(), table, columns, records)
    }

    pub fn update(&self, table: &str, set_columns: &[&str], filter: &str) -> Update<'h> {
        Update::new(self.scope(), table, set_columns, filter)
    }

    pub fn delete(&self, table: &str, filter: &str) -> Delete<'h> {
        Delete::new(self.scope(), table, filter)
    }

    /// Select `columns` (all columns when empty) with an optional filter
    pub fn select(
        &self,
        table: &str,
        columns: &[&str],
        filter: &str,
        params: Vec<Value>,
    ) -> Select<'h> {
        Select::new(self.scope(), table, columns, filter, params)
    }

    /// Select from raw SQL; refinements are rejected
    pub fn search(&self, sql: &str, params: Vec<Value>) -> Select<'h> {
        Select::raw(self.scope(), sql, params)
    }

    /// Begin a transaction on this datasource
    ///
    /// # Errors
    ///
    /// Returns the provider's error unchanged if the transaction cannot be started.
    pub fn begin(&self) -> Result<Transaction<'h>, Error> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::begin_transaction_span().entered();

        log::debug!("begin transaction");
        let handle = self.connection.begin()?;
        Ok(Transaction::new(handle, self.key))
    }
}
