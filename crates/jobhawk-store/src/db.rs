use rusqlite::Connection;

use crate::error::Result;

/// Initialise the jobhawk schema in `conn`. Safe to call on every startup —
/// CREATE IF NOT EXISTS means it's idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS credentials (
            user_id       INTEGER NOT NULL PRIMARY KEY,
            access_token  TEXT    NOT NULL,
            refresh_token TEXT    NOT NULL,
            expires_at    TEXT    NOT NULL    -- RFC-3339 UTC
        );

        CREATE TABLE IF NOT EXISTS preferences (
            user_id      INTEGER NOT NULL PRIMARY KEY,
            enabled      INTEGER NOT NULL DEFAULT 0,
            resume_id    TEXT,
            cover_letter TEXT    NOT NULL,
            keywords     TEXT    NOT NULL DEFAULT '',  -- comma-joined
            min_salary   INTEGER,
            experience   TEXT,                         -- comma-joined, NULL = no filter
            daily_quota  INTEGER NOT NULL DEFAULT 10
        );

        -- Append-only idempotency record: the PK is the whole guarantee.
        CREATE TABLE IF NOT EXISTS submissions (
            user_id    INTEGER NOT NULL,
            posting_id TEXT    NOT NULL,
            PRIMARY KEY (user_id, posting_id)
        );

        -- Derived cache of submissions-today; reset is computed at read time.
        CREATE TABLE IF NOT EXISTS applied_counts (
            user_id      INTEGER NOT NULL PRIMARY KEY,
            count        INTEGER NOT NULL DEFAULT 0,
            last_applied TEXT    NOT NULL    -- RFC-3339 UTC
        );
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        init_db(&conn).unwrap();
    }
}
