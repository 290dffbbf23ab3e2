//! Append-only model version log.

use anyhow::Result;
use rusqlite::{params, Connection};

use super::types::{format_timestamp, parse_timestamp, ModelVersion};

/// Upper bound on rows returned by [`list_versions`].
pub const VERSION_LIST_LIMIT: usize = 100;

/// Append an entry. No uniqueness is enforced on `version`.
pub fn add_version(conn: &Connection, version: &ModelVersion) -> Result<()> {
    let changes = serde_json::to_string(&version.changes)?;
    conn.execute(
        "INSERT INTO versions (id, version, description, changes, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            version.id,
            version.version,
            version.description,
            changes,
            format_timestamp(&version.created_at),
        ],
    )?;
    Ok(())
}

/// Entries in insertion order, at most `limit`.
pub fn list_versions(conn: &Connection, limit: usize) -> Result<Vec<ModelVersion>> {
    let mut stmt = conn.prepare(
        "SELECT id, version, description, changes, created_at FROM versions ORDER BY rowid LIMIT ?1",
    )?;
    let versions = stmt
        .query_map(params![limit as i64], |row| {
            let changes: String = row.get(3)?;
            let created_at: String = row.get(4)?;
            Ok(ModelVersion {
                id: row.get(0)?,
                version: row.get(1)?,
                description: row.get(2)?,
                changes: serde_json::from_str(&changes).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
                created_at: parse_timestamp(4, &created_at)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::Utc;

    fn version(label: &str, changes: &[&str]) -> ModelVersion {
        ModelVersion {
            id: crate::knowledge::types::new_id(),
            version: label.into(),
            description: format!("release {label}"),
            changes: changes.iter().map(|c| c.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn versions_keep_change_order() {
        let conn = db::open_memory_database().unwrap();
        let v = version("1.0", &["first", "second", "third"]);
        add_version(&conn, &v).unwrap();

        let listed = list_versions(&conn, VERSION_LIST_LIMIT).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].changes, vec!["first", "second", "third"]);
        assert_eq!(listed[0].id, v.id);
    }

    #[test]
    fn duplicate_labels_are_allowed() {
        let conn = db::open_memory_database().unwrap();
        add_version(&conn, &version("1.0", &[])).unwrap();
        add_version(&conn, &version("1.0", &["again"])).unwrap();

        let listed = list_versions(&conn, VERSION_LIST_LIMIT).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].changes.is_empty());
        assert_eq!(listed[1].changes, vec!["again"]);
    }
}
