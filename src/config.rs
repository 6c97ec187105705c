//! Configuration utilities re-exported at the crate root.
//!
//! This exposes [`OrmConfig`] and [`DatasourceConfig`] so applications can
//! load settings from `config/config.toml` or `TAGSQL__*` environment
//! variables using `OrmConfig::load()`.

pub use crate::pool::config::*;
