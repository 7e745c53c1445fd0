//! Database schema migrations.

use rusqlite::Connection;
use tracing::info;

use aprime_core::error::AprimeError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), AprimeError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| AprimeError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| AprimeError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: sessions_and_messages");
    }

    if current_version < 2 {
        apply_v2(conn)?;
        info!("Applied migration v2: session_title_derived");
    }

    Ok(())
}

/// Version 1: sessions and their message log.
///
/// Timestamps are epoch milliseconds. `messages.seq` is the insertion order
/// and breaks timestamp ties.
fn apply_v1(conn: &Connection) -> Result<(), AprimeError> {
    conn.execute_batch(
        "
        BEGIN;

        CREATE TABLE IF NOT EXISTS sessions (
            id              TEXT PRIMARY KEY NOT NULL,
            title           TEXT NOT NULL DEFAULT 'New Chat',
            created_at      INTEGER NOT NULL,
            last_modified   INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_last_modified
            ON sessions (last_modified DESC);

        CREATE TABLE IF NOT EXISTS messages (
            seq             INTEGER PRIMARY KEY AUTOINCREMENT,
            id              TEXT NOT NULL UNIQUE,
            session_id      TEXT NOT NULL,
            role            TEXT NOT NULL
                            CHECK (role IN ('user', 'assistant')),
            content         TEXT NOT NULL DEFAULT '',
            timestamp       INTEGER NOT NULL,
            is_image        INTEGER NOT NULL DEFAULT 0,
            is_code         INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_messages_session
            ON messages (session_id, timestamp ASC, seq ASC);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'sessions_and_messages');

        COMMIT;
        ",
    )
    .map_err(|e| AprimeError::Storage(format!("Migration v1 failed: {}", e)))?;
    Ok(())
}

/// Version 2: track title derivation apart from the title text.
///
/// Sessions titled before this version count as derived unless they still
/// carry the placeholder.
fn apply_v2(conn: &Connection) -> Result<(), AprimeError> {
    conn.execute_batch(
        "
        BEGIN;

        ALTER TABLE sessions ADD COLUMN title_derived INTEGER NOT NULL DEFAULT 0;

        UPDATE sessions SET title_derived = 1 WHERE title <> 'New Chat';

        INSERT INTO schema_migrations (version, name) VALUES (2, 'session_title_derived');

        COMMIT;
        ",
    )
    .map_err(|e| AprimeError::Storage(format!("Migration v2 failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(versions, 2);
    }

    #[test]
    fn test_v2_marks_existing_titles_derived() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_migrations (
                version     INTEGER PRIMARY KEY NOT NULL,
                name        TEXT NOT NULL,
                applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            );",
        )
        .unwrap();
        apply_v1(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO sessions (id, title, created_at, last_modified) VALUES ('fresh', 'New Chat', 0, 0);
             INSERT INTO sessions (id, title, created_at, last_modified) VALUES ('named', 'Trip plans', 0, 0);",
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let derived = |id: &str| -> i64 {
            conn.query_row(
                "SELECT title_derived FROM sessions WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .unwrap()
        };
        assert_eq!(derived("fresh"), 0);
        assert_eq!(derived("named"), 1);
    }

    #[test]
    fn test_role_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO sessions (id, created_at, last_modified) VALUES ('s1', 0, 0)",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO messages (id, session_id, role, content, timestamp)
             VALUES ('m1', 's1', 'system', 'hi', 0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_session_title_defaults_to_placeholder() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO sessions (id, created_at, last_modified) VALUES ('s1', 0, 0)",
            [],
        )
        .unwrap();
        let title: String = conn
            .query_row("SELECT title FROM sessions WHERE id = 's1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(title, aprime_core::types::PLACEHOLDER_TITLE);
    }
}
