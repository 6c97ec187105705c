//! SQLite connection establishment
//!
//! Provides:
//! - Connection string validation
//! - Opening a `rusqlite::Connection` (file path, `file:` URI or `:memory:`)
//! - The health probe run when a pool opens

use crate::error::Error;
use rusqlite::{Connection, OpenFlags};
use std::time::{Duration, Instant};

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether the connection string names a private in-memory database
pub fn is_memory(connection_string: &str) -> bool {
    let s = connection_string.trim();
    s == ":memory:" || (s.starts_with("file:") && s.contains("mode=memory"))
}

/// Validates a connection string
///
/// # Supported Formats
///
/// - `:memory:`
/// - a file path: `app.db`, `/var/lib/app/app.db`
/// - a URI: `file:app.db?mode=ro`
pub fn validate_connection_string(connection_string: &str) -> Result<(), Error> {
    let s = connection_string.trim();
    if s.is_empty() {
        return Err(Error::InvalidConnectionString(
            "Connection string cannot be empty".to_string(),
        ));
    }
    if s.contains('\0') {
        return Err(Error::InvalidConnectionString(
            "Connection string cannot contain NUL bytes".to_string(),
        ));
    }
    if s.starts_with("file:") && s.len() == "file:".len() {
        return Err(Error::InvalidConnectionString(
            "Connection URI must name a database: file:<path>[?options]".to_string(),
        ));
    }
    Ok(())
}

/// Open a connection
///
/// # Arguments
///
/// * `connection_string` - `:memory:`, a file path, or a `file:` URI
///
/// # Returns
///
/// Returns an open `rusqlite::Connection` with a busy timeout set.
///
/// # Examples
///
/// ```no_run
/// use tagsql::connection::connect;
///
/// let conn = connect("app.db")?;
/// let memory = connect(":memory:")?;
/// # Ok::<(), tagsql::Error>(())
/// ```
pub fn connect(connection_string: &str) -> Result<Connection, Error> {
    #[cfg(feature = "tracing")]
    let _span = tracing_helpers::acquire_connection_span(connection_string).entered();

    let start = Instant::now();
    validate_connection_string(connection_string)?;

    let s = connection_string.trim();
    let conn = if s == ":memory:" {
        Connection::open_in_memory()?
    } else if s.starts_with("file:") {
        Connection::open_with_flags(s, OpenFlags::default() | OpenFlags::SQLITE_OPEN_URI)?
    } else {
        Connection::open(s)?
    };
    conn.busy_timeout(BUSY_TIMEOUT)?;

    log::debug!("opened connection to {s} in {:?}", start.elapsed());
    Ok(conn)
}

/// Run `select 1` on the connection
///
/// # Errors
///
/// Returns `Error::Pool` when the probe does not answer `1`, or the driver error.
pub fn check_connection_health(conn: &Connection) -> Result<(), Error> {
    let answer: i64 = conn.query_row("select 1", [], |row| row.get(0))?;
    if answer == 1 {
        Ok(())
    } else {
        Err(Error::Pool(format!("health probe answered {answer}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_connection_string() {
        assert!(validate_connection_string(":memory:").is_ok());
        assert!(validate_connection_string("app.db").is_ok());
        assert!(validate_connection_string("file:app.db?mode=ro").is_ok());

        assert!(validate_connection_string("").is_err());
        assert!(validate_connection_string("   ").is_err());
        assert!(validate_connection_string("file:").is_err());
        assert!(validate_connection_string("a\0b").is_err());
    }

    #[test]
    fn test_is_memory() {
        assert!(is_memory(":memory:"));
        assert!(is_memory("file:x?mode=memory&cache=shared"));
        assert!(!is_memory("app.db"));
    }

    #[test]
    fn test_connect_memory_and_probe() {
        let conn = connect(":memory:").unwrap();
        check_connection_health(&conn).unwrap();
    }

    #[test]
    fn test_connect_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.db");
        let conn = connect(path.to_str().unwrap()).unwrap();
        check_connection_health(&conn).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_connect_rejects_invalid() {
        assert!(matches!(
            connect(""),
            Err(Error::InvalidConnectionString(_))
        ));
    }
}
