//! SQL DDL for all Monoque collections.
//!
//! One table per document collection: `knowledge`, `concepts`, `messages` and
//! `versions`, plus `schema_meta`. Timestamps are RFC 3339 text. All DDL uses
//! `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// Version-1 DDL. Later columns are added by [`super::migrations`].
const SCHEMA_SQL: &str = r#"
-- Taught or imported knowledge
CREATE TABLE IF NOT EXISTS knowledge (
    id TEXT PRIMARY KEY,
    concept TEXT NOT NULL,
    definition TEXT NOT NULL,
    verified INTEGER NOT NULL DEFAULT 1,
    source TEXT NOT NULL DEFAULT 'Enver' CHECK(source IN ('Enver','Internet')),
    created_at TEXT NOT NULL,
    confidence_score INTEGER NOT NULL DEFAULT 100 CHECK(confidence_score >= 0 AND confidence_score <= 100)
);

CREATE INDEX IF NOT EXISTS idx_knowledge_source ON knowledge(source);

-- Concepts picked out of assistant replies
CREATE TABLE IF NOT EXISTS concepts (
    id TEXT PRIMARY KEY,
    concept TEXT NOT NULL,
    definition TEXT NOT NULL,
    verified INTEGER NOT NULL,
    learned_at TEXT NOT NULL
);

-- Chat history, partitioned by session_id
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    role TEXT NOT NULL CHECK(role IN ('user','assistant')),
    content TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    metadata TEXT
);

CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, timestamp);

-- Model version log (append-only)
CREATE TABLE IF NOT EXISTS versions (
    id TEXT PRIMARY KEY,
    version TEXT NOT NULL,
    description TEXT NOT NULL,
    changes TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for table in ["knowledge", "concepts", "messages", "versions", "schema_meta"] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }

    #[test]
    fn role_check_rejects_unknown_role() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO messages (id, session_id, role, content, timestamp) \
             VALUES ('m1', 's1', 'system', 'hi', '2024-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }
}
