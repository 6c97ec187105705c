//! Bounded SQLite connection pool
//!
//! Idle connections wait in a bounded `crossbeam-channel` queue. A checkout
//! takes an idle connection, opens a new one while fewer than
//! `max_connections` are open, or waits up to `pool_timeout_seconds` for one
//! to be returned. Returned connections beyond `max_idle_connections` are
//! closed, unless a waiting checkout takes them over.

use super::config::DatasourceConfig;
use super::sqlite::SqliteTransaction;
use crate::connection::{check_connection_health, connect, is_memory};
use crate::error::Error;
use crate::executor::{Connection, Executor, Session, TransactionHandle};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// How long a checkout waits before logging that the pool is exhausted
const EXHAUSTED_WARN_AFTER: Duration = Duration::from_secs(1);

/// SQLite-backed [`Connection`]
pub struct SqlitePool {
    config: DatasourceConfig,
    idle_tx: Sender<rusqlite::Connection>,
    idle_rx: Receiver<rusqlite::Connection>,
    open: AtomicUsize,
}

impl SqlitePool {
    /// Open the pool and verify its first connection with a health probe
    ///
    /// A private in-memory database exists once per connection, so an
    /// in-memory pool is limited to a single connection.
    pub fn open(mut config: DatasourceConfig) -> Result<Self, Error> {
        if is_memory(&config.url) {
            config.max_connections = 1;
            config.max_idle_connections = 1;
        }

        let first = connect(&config.url)?;
        check_connection_health(&first)?;

        // a zero-capacity queue only hands connections to checkouts already waiting
        let (idle_tx, idle_rx) = bounded(config.max_idle_connections);
        let pool = SqlitePool {
            config,
            idle_tx,
            idle_rx,
            open: AtomicUsize::new(1),
        };
        pool.release(first);

        log::info!(
            "datasource {} ready ({}, max {} connections, {} idle)",
            pool.config.name,
            pool.config.url,
            pool.limit_description(),
            pool.config.max_idle_connections
        );
        Ok(pool)
    }

    pub fn config(&self) -> &DatasourceConfig {
        &self.config
    }

    /// Connections currently open, idle or checked out
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn idle_connections(&self) -> usize {
        self.idle_rx.len()
    }

    fn limit_description(&self) -> String {
        match self.config.max_connections {
            0 => "unlimited".to_string(),
            n => n.to_string(),
        }
    }

    /// Check out a connection, waiting while the pool is exhausted
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pool`] when no connection is returned within
    /// `pool_timeout_seconds`, and the open error when a new connection fails.
    pub fn checkout(&self) -> Result<PooledConnection<'_>, Error> {
        let timeout = Duration::from_secs(self.config.pool_timeout_seconds);
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(conn) = self.idle_rx.try_recv() {
                return Ok(PooledConnection::new(self, conn));
            }

            let max = self.config.max_connections;
            let current = self.open.load(Ordering::SeqCst);
            if max == 0 || current < max {
                if self
                    .open
                    .compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    continue;
                }
                return match connect(&self.config.url) {
                    Ok(conn) => Ok(PooledConnection::new(self, conn)),
                    Err(err) => {
                        self.open.fetch_sub(1, Ordering::SeqCst);
                        Err(err)
                    }
                };
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Pool(format!(
                    "datasource {}: timed out after {}s waiting for one of {} busy connections",
                    self.config.name, self.config.pool_timeout_seconds, max
                )));
            }

            match self.idle_rx.recv_timeout(remaining.min(EXHAUSTED_WARN_AFTER)) {
                Ok(conn) => return Ok(PooledConnection::new(self, conn)),
                Err(RecvTimeoutError::Timeout) => log::warn!(
                    "datasource {}: all {} connections busy, waiting",
                    self.config.name,
                    max
                ),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::Pool(format!(
                        "datasource {} is closed",
                        self.config.name
                    )))
                }
            }
        }
    }

    fn release(&self, conn: rusqlite::Connection) {
        match self.idle_tx.try_send(conn) {
            Ok(()) => {}
            Err(TrySendError::Full(conn)) | Err(TrySendError::Disconnected(conn)) => {
                drop(conn);
                self.open.fetch_sub(1, Ordering::SeqCst);
                log::trace!("datasource {}: closed surplus idle connection", self.config.name);
            }
        }
    }
}

impl Executor for SqlitePool {
    fn acquire(&self) -> Result<Box<dyn Session + '_>, Error> {
        Ok(Box::new(self.checkout()?))
    }
}

impl Connection for SqlitePool {
    fn begin(&self) -> Result<Box<dyn TransactionHandle + '_>, Error> {
        Ok(Box::new(SqliteTransaction::begin(self.checkout()?)?))
    }
}

/// A checked-out connection, returned to its pool when dropped
pub struct PooledConnection<'p> {
    pool: &'p SqlitePool,
    conn: Option<rusqlite::Connection>,
}

impl<'p> PooledConnection<'p> {
    fn new(pool: &'p SqlitePool, conn: rusqlite::Connection) -> Self {
        PooledConnection {
            pool,
            conn: Some(conn),
        }
    }

    /// The underlying `rusqlite` connection
    pub fn get(&self) -> Result<&rusqlite::Connection, Error> {
        self.conn
            .as_ref()
            .ok_or_else(|| Error::Pool("connection already returned to the pool".to_string()))
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}
