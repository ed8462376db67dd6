//! String key-value operations on the `kv_store` table.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

/// Reads the value stored under `key`.
///
/// Returns `Ok(None)` when the key is absent.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_item(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM kv_store WHERE key = ?1",
        rusqlite::params![key],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to read key {key}"))
}

/// Stores `value` under `key`, replacing any previous value.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn set_item(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        rusqlite::params![key, value],
    )
    .with_context(|| format!("failed to write key {key}"))?;
    Ok(())
}

/// Deletes `key`. Returns whether a row was removed.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn remove_item(conn: &Connection, key: &str) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM kv_store WHERE key = ?1", rusqlite::params![key])
        .with_context(|| format!("failed to delete key {key}"))?;
    Ok(deleted > 0)
}
