//! Key-value slots: each row holds one serialized value under a name.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result, params};

pub fn read_slot(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .optional()
}

/// Insert or replace the whole value stored under `key`.
pub fn write_slot(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    let mut stmt = conn.prepare_cached(
        "INSERT INTO slots (key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )?;
    stmt.execute(params![key, value, now])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    #[test]
    fn write_replaces_previous_value() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();

        assert_eq!(read_slot(&conn, "k").unwrap(), None);

        write_slot(&conn, "k", "[1]").unwrap();
        write_slot(&conn, "k", "[1,2]").unwrap();

        assert_eq!(read_slot(&conn, "k").unwrap().as_deref(), Some("[1,2]"));
    }
}
