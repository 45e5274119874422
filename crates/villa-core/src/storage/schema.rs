//! SQLite schema for the slot store
//!
//! One row per slot, plus the tables left behind by the retired storage
//! layout. The legacy tables are created empty on fresh installs so the
//! absorption step can read them unconditionally.

use rusqlite::{Connection, OptionalExtension, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 2;

/// `schema_info` key of the one-time legacy absorption marker
pub const LEGACY_MARKER_KEY: &str = "legacy_absorbed";

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking and markers
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Live and draft documents
        CREATE TABLE IF NOT EXISTS slots (
            name TEXT PRIMARY KEY CHECK (name IN ('live', 'draft')),
            payload TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Documents from the retired single-record layout
        CREATE TABLE IF NOT EXISTS legacy_records (
            key TEXT PRIMARY KEY,
            payload TEXT NOT NULL
        );

        -- Image payloads referenced by indirection key from legacy records
        CREATE TABLE IF NOT EXISTS legacy_blobs (
            key TEXT PRIMARY KEY,
            payload TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM schema_info WHERE key = 'version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(version.and_then(|v| v.parse().ok()))
}

/// Check if schema needs initialization or migration
pub fn needs_init(conn: &Connection) -> bool {
    let table_exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_info'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false);

    if !table_exists {
        return true;
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"slots".to_string()));
        assert!(tables.contains(&"legacy_records".to_string()));
        assert!(tables.contains(&"legacy_blobs".to_string()));
        assert!(tables.contains(&"schema_info".to_string()));
    }

    #[test]
    fn test_schema_version() {
        let conn = Connection::open_in_memory().unwrap();

        assert!(needs_init(&conn));

        init_schema(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
        assert!(!needs_init(&conn));
    }

    #[test]
    fn test_init_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO slots (name, payload, updated_at) VALUES ('live', '{}', 0)",
            [],
        )
        .unwrap();

        init_schema(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM slots", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_slot_names_are_constrained() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO slots (name, payload, updated_at) VALUES ('staging', '{}', 0)",
            [],
        );
        assert!(result.is_err());
    }
}
