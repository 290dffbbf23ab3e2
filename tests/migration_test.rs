use monoque::db::{self, migrations};
use monoque::knowledge::store::get_knowledge;
use rusqlite::Connection;
use tempfile::TempDir;

/// Lay down a version 1 database by hand, the way older builds left it.
fn create_v1_database(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "
        CREATE TABLE knowledge (
            id TEXT PRIMARY KEY,
            concept TEXT NOT NULL,
            definition TEXT NOT NULL,
            verified INTEGER NOT NULL DEFAULT 1,
            source TEXT NOT NULL DEFAULT 'Enver',
            created_at TEXT NOT NULL,
            confidence_score INTEGER NOT NULL DEFAULT 100
        );
        CREATE TABLE schema_meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);
        INSERT INTO schema_meta (key, value) VALUES ('schema_version', '1');
        INSERT INTO knowledge (id, concept, definition, verified, source, created_at, confidence_score)
        VALUES ('legacy-1', 'Photosynthesis', 'Plants turning light into sugar', 1, 'Enver',
                '2024-05-01T10:00:00.000000Z', 90);
        ",
    )
    .unwrap();
}

#[test]
fn v1_database_upgrades_and_keeps_rows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.db");
    create_v1_database(&path);

    let conn = db::open_database(&path).unwrap();

    assert_eq!(
        migrations::get_schema_version(&conn).unwrap(),
        migrations::CURRENT_SCHEMA_VERSION
    );
    assert!(migrations::has_column(&conn, "knowledge", "validation_feedback").unwrap());

    let item = get_knowledge(&conn, "legacy-1").unwrap().unwrap();
    assert_eq!(item.concept, "Photosynthesis");
    assert_eq!(item.confidence_score, 90);
    assert!(item.validation_feedback.is_none());

    // tables missing from v1 are created on open
    for table in ["concepts", "messages", "versions"] {
        let exists: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(exists, 1, "missing table {table}");
    }
}

#[test]
fn reopening_current_database_is_noop() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("monoque.db");

    drop(db::open_database(&path).unwrap());
    let conn = db::open_database(&path).unwrap();
    assert_eq!(
        migrations::get_schema_version(&conn).unwrap(),
        migrations::CURRENT_SCHEMA_VERSION
    );
}
