use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;

/// Initialize the database.
/// All schema creation goes through the migration engine; the versions
/// applied by this call are returned.
pub fn init_db(conn: &Connection) -> AppResult<Vec<&'static str>> {
    let applied = run_pending_migrations(conn)?;
    Ok(applied)
}
