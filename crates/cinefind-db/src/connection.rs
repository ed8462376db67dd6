//! Opening the favorites database.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::dirs::AppDir;
use super::migrations::run_migrations;

/// Database file name inside the data directory.
pub const DB_FILE: &str = "cinefind.db";

/// How long a write waits for another process holding the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens `cinefind.db` in the data directory, creating it if needed.
///
/// `dir` overrides the data directory (see [`AppDir::resolve`]).
///
/// # Errors
///
/// Returns an error if the directory cannot be resolved or created, or if
/// [`open_db_file`] fails.
pub fn open_db(dir: Option<&Path>) -> Result<Connection> {
    let data_dir = AppDir::Data.resolve(dir)?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create directory {}", data_dir.display()))?;
    open_db_file(&data_dir.join(DB_FILE))
}

/// Opens the database at `path` and brings its schema up to date.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or migrations fail.
pub fn open_db_file(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    run_migrations(&conn).context("database migration failed")?;
    tracing::debug!(path = %path.display(), "favorites database ready");
    Ok(conn)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn user_version(conn: &Connection) -> u32 {
        conn.pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_open_db_creates_nested_dir() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        // Act
        let conn = open_db(Some(&nested)).unwrap();

        // Assert
        assert!(nested.join(DB_FILE).exists());
        assert!(user_version(&conn) > 0);
    }

    #[test]
    fn test_reopen_keeps_schema_version() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.db");
        let first = user_version(&open_db_file(&path).unwrap());

        // Act
        let conn = open_db_file(&path).unwrap();

        // Assert
        assert_eq!(user_version(&conn), first);
    }

    #[test]
    fn test_open_db_file_in_missing_dir_fails() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(DB_FILE);

        // Act
        let result = open_db_file(&path);

        // Assert
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("failed to open database"));
    }
}
