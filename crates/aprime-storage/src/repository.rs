//! SQLite-backed implementation of the session store.
//!
//! Every trait method runs under the database mutex, either as a single
//! statement or inside one transaction.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row};
use tracing::debug;

use aprime_core::error::{AprimeError, Result};
use aprime_core::store::SessionStore;
use aprime_core::types::{Message, Role, Session};

use crate::db::Database;

/// Session and message persistence on top of [`Database`].
#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store over a fresh in-memory database.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Arc::new(Database::in_memory()?)))
    }
}

/// Current time truncated to the millisecond precision the schema stores.
fn now() -> (i64, DateTime<Utc>) {
    let ms = Utc::now().timestamp_millis();
    (ms, from_millis(ms))
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

fn storage_err(context: &str) -> impl Fn(rusqlite::Error) -> AprimeError + '_ {
    move |e| AprimeError::Storage(format!("{}: {}", context, e))
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: from_millis(row.get(2)?),
        last_modified: from_millis(row.get(3)?),
        title_derived: row.get::<_, i64>(4)? != 0,
    })
}

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    let role: String = row.get(2)?;
    let role = role
        .parse::<Role>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?;
    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role,
        content: row.get(3)?,
        timestamp: from_millis(row.get(4)?),
        is_image: row.get::<_, i64>(5)? != 0,
        is_code: row.get::<_, i64>(6)? != 0,
    })
}

impl SessionStore for SqliteStore {
    fn create_session(&self) -> Result<Session> {
        let (ms, at) = now();
        let session = Session::new(at);
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, title, created_at, last_modified)
                 VALUES (?1, ?2, ?3, ?3)",
                rusqlite::params![session.id, session.title, ms],
            )
            .map_err(storage_err("Failed to create session"))?;
            Ok(())
        })?;
        debug!(session_id = %session.id, "Created session");
        Ok(session)
    }

    fn get_session(&self, id: &str) -> Result<Option<Session>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, title, created_at, last_modified, title_derived FROM sessions WHERE id = ?1",
                rusqlite::params![id],
                row_to_session,
            )
            .optional()
            .map_err(storage_err("Failed to load session"))
        })
    }

    fn session_title(&self, id: &str) -> Result<Option<String>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT title FROM sessions WHERE id = ?1",
                rusqlite::params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage_err("Failed to load session title"))
        })
    }

    fn set_session_title(&self, id: &str, title: &str) -> Result<bool> {
        let (ms, _) = now();
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE sessions
                     SET title = ?2, title_derived = 1, last_modified = MAX(last_modified, ?3)
                     WHERE id = ?1",
                    rusqlite::params![id, title, ms],
                )
                .map_err(storage_err("Failed to set session title"))?;
            Ok(changed > 0)
        })
    }

    fn set_derived_title(&self, id: &str, title: &str) -> Result<bool> {
        let (ms, _) = now();
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE sessions
                     SET title = ?2, title_derived = 1, last_modified = MAX(last_modified, ?3)
                     WHERE id = ?1 AND title_derived = 0",
                    rusqlite::params![id, title, ms],
                )
                .map_err(storage_err("Failed to set session title"))?;
            Ok(changed > 0)
        })
    }

    fn list_sessions(&self) -> Result<Vec<Session>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, created_at, last_modified, title_derived FROM sessions
                     ORDER BY last_modified DESC, created_at DESC, rowid DESC",
                )
                .map_err(storage_err("Failed to list sessions"))?;
            let rows = stmt
                .query_map([], row_to_session)
                .map_err(storage_err("Failed to list sessions"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(storage_err("Failed to read session row"))
        })
    }

    fn delete_session(&self, id: &str) -> Result<bool> {
        let deleted = self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(storage_err("Failed to begin transaction"))?;
            tx.execute(
                "DELETE FROM messages WHERE session_id = ?1",
                rusqlite::params![id],
            )
            .map_err(storage_err("Failed to delete messages"))?;
            let removed = tx
                .execute("DELETE FROM sessions WHERE id = ?1", rusqlite::params![id])
                .map_err(storage_err("Failed to delete session"))?;
            tx.commit()
                .map_err(storage_err("Failed to commit session delete"))?;
            Ok(removed > 0)
        })?;
        if deleted {
            debug!(session_id = %id, "Deleted session");
        }
        Ok(deleted)
    }

    fn append_message(&self, session_id: &str, role: Role, content: &str) -> Result<Message> {
        let mut message = Message::new(session_id, role, content);

        let ms = self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(storage_err("Failed to begin transaction"))?;
            // Clock reads happen under the lock and never go backwards within
            // a session.
            let (now_ms, _) = now();
            let ms: i64 = tx
                .query_row(
                    "SELECT MAX(?2, COALESCE(MAX(timestamp), ?2)) FROM messages
                     WHERE session_id = ?1",
                    rusqlite::params![session_id, now_ms],
                    |row| row.get(0),
                )
                .map_err(storage_err("Failed to read latest timestamp"))?;
            let touched = tx
                .execute(
                    "UPDATE sessions SET last_modified = MAX(last_modified, ?2) WHERE id = ?1",
                    rusqlite::params![session_id, ms],
                )
                .map_err(storage_err("Failed to touch session"))?;
            if touched == 0 {
                return Err(AprimeError::NotFound(format!("session {}", session_id)));
            }
            tx.execute(
                "INSERT INTO messages (id, session_id, role, content, timestamp, is_image, is_code)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    message.id,
                    message.session_id,
                    message.role.as_str(),
                    message.content,
                    ms,
                    message.is_image as i32,
                    message.is_code as i32,
                ],
            )
            .map_err(storage_err("Failed to append message"))?;
            tx.commit()
                .map_err(storage_err("Failed to commit message"))?;
            Ok(ms)
        })?;

        message.timestamp = from_millis(ms);
        Ok(message)
    }

    fn list_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, session_id, role, content, timestamp, is_image, is_code
                     FROM messages WHERE session_id = ?1
                     ORDER BY timestamp ASC, seq ASC",
                )
                .map_err(storage_err("Failed to list messages"))?;
            let rows = stmt
                .query_map(rusqlite::params![session_id], row_to_message)
                .map_err(storage_err("Failed to list messages"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(storage_err("Failed to read message row"))
        })
    }

    fn count_messages(&self, session_id: &str) -> Result<usize> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM messages WHERE session_id = ?1",
                    rusqlite::params![session_id],
                    |row| row.get(0),
                )
                .map_err(storage_err("Failed to count messages"))?;
            Ok(count as usize)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aprime_core::types::PLACEHOLDER_TITLE;

    fn store() -> SqliteStore {
        SqliteStore::in_memory().unwrap()
    }

    // ---- sessions ----

    #[test]
    fn test_create_and_get_session() {
        let store = store();
        let session = store.create_session().unwrap();
        assert_eq!(session.title, PLACEHOLDER_TITLE);

        let loaded = store.get_session(&session.id).unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_unknown_session_resolves_to_none() {
        let store = store();
        assert!(store.get_session("does-not-exist").unwrap().is_none());
        assert!(store.session_title("{not a uuid}").unwrap().is_none());
        assert!(store.list_messages("does-not-exist").unwrap().is_empty());
        assert_eq!(store.count_messages("does-not-exist").unwrap(), 0);
        assert!(!store.delete_session("does-not-exist").unwrap());
        assert!(!store.set_session_title("does-not-exist", "x").unwrap());
    }

    #[test]
    fn test_set_derived_title_is_compare_and_set() {
        let store = store();
        let session = store.create_session().unwrap();
        assert!(!session.title_derived);

        assert!(store.set_derived_title(&session.id, "First title").unwrap());
        assert!(!store.set_derived_title(&session.id, "Second title").unwrap());

        let loaded = store.get_session(&session.id).unwrap().unwrap();
        assert_eq!(loaded.title, "First title");
        assert!(loaded.title_derived);
    }

    #[test]
    fn test_derived_title_equal_to_placeholder_still_counts() {
        let store = store();
        let session = store.create_session().unwrap();

        assert!(store
            .set_derived_title(&session.id, PLACEHOLDER_TITLE)
            .unwrap());
        assert!(!store.set_derived_title(&session.id, "Later").unwrap());

        let loaded = store.get_session(&session.id).unwrap().unwrap();
        assert_eq!(loaded.title, PLACEHOLDER_TITLE);
        assert!(!loaded.needs_title());
    }

    #[test]
    fn test_set_derived_title_unknown_session() {
        let store = store();
        assert!(!store.set_derived_title("does-not-exist", "x").unwrap());
    }

    #[test]
    fn test_set_session_title_overwrites() {
        let store = store();
        let session = store.create_session().unwrap();
        assert!(store.set_session_title(&session.id, "Renamed").unwrap());
        assert_eq!(
            store.session_title(&session.id).unwrap().as_deref(),
            Some("Renamed")
        );
        // A manual title is never replaced by derivation.
        assert!(!store.set_derived_title(&session.id, "Derived").unwrap());
    }

    #[test]
    fn test_list_sessions_most_recent_first() {
        let store = store();
        let a = store.create_session().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = store.create_session().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        // Writing to `a` moves it to the front.
        store.append_message(&a.id, Role::User, "hello").unwrap();

        let ids: Vec<String> = store
            .list_sessions()
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_delete_session_cascades_messages() {
        let store = store();
        let keep = store.create_session().unwrap();
        let gone = store.create_session().unwrap();
        store.append_message(&keep.id, Role::User, "stay").unwrap();
        store.append_message(&gone.id, Role::User, "one").unwrap();
        store.append_message(&gone.id, Role::Assistant, "two").unwrap();

        assert!(store.delete_session(&gone.id).unwrap());
        assert!(store.get_session(&gone.id).unwrap().is_none());
        assert!(store.list_messages(&gone.id).unwrap().is_empty());
        assert_eq!(store.count_messages(&keep.id).unwrap(), 1);

        assert!(!store.delete_session(&gone.id).unwrap());
    }

    // ---- messages ----

    #[test]
    fn test_append_and_list_messages_in_order() {
        let store = store();
        let session = store.create_session().unwrap();
        for i in 0..10 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            store
                .append_message(&session.id, role, &format!("message {}", i))
                .unwrap();
        }

        let messages = store.list_messages(&session.id).unwrap();
        assert_eq!(messages.len(), 10);
        for (i, msg) in messages.iter().enumerate() {
            assert_eq!(msg.content, format!("message {}", i));
        }
        assert_eq!(store.count_messages(&session.id).unwrap(), 10);
    }

    #[test]
    fn test_append_message_round_trips_fields() {
        let store = store();
        let session = store.create_session().unwrap();
        let written = store
            .append_message(&session.id, Role::Assistant, "```py\nprint(1)\n```")
            .unwrap();
        assert!(written.is_code);
        assert!(!written.is_image);

        let read = store.list_messages(&session.id).unwrap();
        assert_eq!(read, vec![written]);
    }

    #[test]
    fn test_append_message_flags_image() {
        let store = store();
        let session = store.create_session().unwrap();
        let msg = store
            .append_message(&session.id, Role::Assistant, "data:image/png;base64,AAAA")
            .unwrap();
        assert!(msg.is_image);
    }

    #[test]
    fn test_append_message_bumps_last_modified() {
        let store = store();
        let session = store.create_session().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.append_message(&session.id, Role::User, "hi").unwrap();

        let loaded = store.get_session(&session.id).unwrap().unwrap();
        assert!(loaded.last_modified > session.last_modified);
        assert_eq!(loaded.created_at, session.created_at);
    }

    #[test]
    fn test_append_timestamp_never_precedes_latest() {
        let store = store();
        let session = store.create_session().unwrap();

        // A message stamped ahead of the clock, as after the clock steps back.
        let ahead = Utc::now().timestamp_millis() + 60_000;
        store
            .db
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO messages (id, session_id, role, content, timestamp)
                     VALUES ('early', ?1, 'user', 'question', ?2)",
                    rusqlite::params![session.id, ahead],
                )
                .map_err(storage_err("seed"))?;
                Ok(())
            })
            .unwrap();

        let reply = store
            .append_message(&session.id, Role::Assistant, "answer")
            .unwrap();
        assert_eq!(reply.timestamp.timestamp_millis(), ahead);

        let contents: Vec<String> = store
            .list_messages(&session.id)
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["question", "answer"]);
    }

    #[test]
    fn test_append_to_unknown_session_is_not_found() {
        let store = store();
        let err = store
            .append_message("missing", Role::User, "hello")
            .unwrap_err();
        assert!(matches!(err, AprimeError::NotFound(_)));
    }

    #[test]
    fn test_store_shared_across_threads() {
        let store = store();
        let session = store.create_session().unwrap();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                let id = session.id.clone();
                std::thread::spawn(move || {
                    for i in 0..5 {
                        store
                            .append_message(&id, Role::User, &format!("{}-{}", t, i))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.count_messages(&session.id).unwrap(), 20);
    }
}
