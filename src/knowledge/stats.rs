use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

use super::types::{KnowledgeSource, Phase};

/// Response for `GET /stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStats {
    pub total_concepts: u64,
    pub total_sessions: u64,
    pub total_messages: u64,
    /// Knowledge taught by the user.
    pub verified_knowledge: u64,
    /// Knowledge learned from the internet.
    pub internet_knowledge: u64,
    pub current_phase: Phase,
}

/// Compute aggregate counts over the stored collections.
pub fn system_stats(conn: &Connection, phase: Phase) -> Result<SystemStats> {
    Ok(SystemStats {
        total_concepts: count(conn, "SELECT COUNT(*) FROM concepts")?,
        total_sessions: count(conn, "SELECT COUNT(DISTINCT session_id) FROM messages")?,
        total_messages: count(conn, "SELECT COUNT(*) FROM messages")?,
        verified_knowledge: count_by_source(conn, KnowledgeSource::TaughtByUser)?,
        internet_knowledge: count_by_source(conn, KnowledgeSource::Internet)?,
        current_phase: phase,
    })
}

fn count(conn: &Connection, sql: &str) -> Result<u64> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n as u64)
}

fn count_by_source(conn: &Connection, source: KnowledgeSource) -> Result<u64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM knowledge WHERE source = ?1",
        params![source.as_str()],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::knowledge::messages::save_message;
    use crate::knowledge::store::{insert_knowledge, record_learned_concept};
    use crate::knowledge::types::{ExtractedConcept, KnowledgeItem, Role};

    #[test]
    fn test_empty_db_stats() {
        let conn = db::open_memory_database().unwrap();
        let stats = system_stats(&conn, Phase::Offline).unwrap();
        assert_eq!(stats.total_concepts, 0);
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.total_messages, 0);
        assert_eq!(stats.verified_knowledge, 0);
        assert_eq!(stats.internet_knowledge, 0);
        assert_eq!(stats.current_phase, Phase::Offline);
    }

    #[test]
    fn test_stats_counts() {
        let mut conn = db::open_memory_database().unwrap();
        save_message(&conn, "a", Role::User, "hi", None).unwrap();
        save_message(&conn, "a", Role::Assistant, "hello", None).unwrap();
        save_message(&conn, "b", Role::User, "hey", None).unwrap();

        record_learned_concept(
            &mut conn,
            &ExtractedConcept {
                concept: "Gravity".into(),
                definition: "Pull".into(),
            },
        )
        .unwrap();
        let mut internet = KnowledgeItem::taught("Ohm's law", "V = IR");
        internet.source = KnowledgeSource::Internet;
        insert_knowledge(&conn, &internet).unwrap();

        let stats = system_stats(&conn, Phase::Online).unwrap();
        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_concepts, 1);
        assert_eq!(stats.verified_knowledge, 1);
        assert_eq!(stats.internet_knowledge, 1);
        assert_eq!(stats.current_phase, Phase::Online);
    }

    #[test]
    fn test_stats_serializes_phase_lowercase() {
        let conn = db::open_memory_database().unwrap();
        let stats = system_stats(&conn, Phase::Online).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["current_phase"], "online");
    }
}
