//! SQLite connection provider
//!
//! - [`DatasourceConfig`] / [`OrmConfig`]: configuration, loaded with the `config` crate
//! - [`SqlitePool`]: bounded pool implementing [`Connection`](crate::Connection)
//! - [`SqliteTransaction`]: transaction on one checked-out connection

pub mod config;
mod manager;
mod sqlite;

pub use config::{DatasourceConfig, OrmConfig};
pub use manager::{PooledConnection, SqlitePool};
pub use sqlite::SqliteTransaction;
