//! Knowledge and learned-concept collections.
//!
//! Plain inserts and list-all reads capped at [`LIST_LIMIT`] rows, plus
//! [`record_learned_concept`], which writes the knowledge item and its
//! concept record for one extracted pair inside a single transaction.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::types::{
    format_timestamp, parse_enum, parse_timestamp, ConceptLearned, ExtractedConcept,
    KnowledgeItem,
};

/// Upper bound on rows returned by list operations.
pub const LIST_LIMIT: usize = 1000;

const KNOWLEDGE_COLUMNS: &str =
    "id, concept, definition, verified, source, created_at, confidence_score, validation_feedback";

/// Insert a knowledge item as-is.
pub fn insert_knowledge(conn: &Connection, item: &KnowledgeItem) -> Result<()> {
    conn.execute(
        "INSERT INTO knowledge (id, concept, definition, verified, source, created_at, confidence_score, validation_feedback) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            item.id,
            item.concept,
            item.definition,
            item.verified,
            item.source.as_str(),
            format_timestamp(&item.created_at),
            item.confidence_score,
            item.validation_feedback,
        ],
    )?;
    Ok(())
}

/// All knowledge items in insertion order, at most `limit`.
pub fn list_knowledge(conn: &Connection, limit: usize) -> Result<Vec<KnowledgeItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {KNOWLEDGE_COLUMNS} FROM knowledge ORDER BY rowid LIMIT ?1"
    ))?;
    let items = stmt
        .query_map(params![limit as i64], knowledge_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// Fetch a single knowledge item by id.
pub fn get_knowledge(conn: &Connection, id: &str) -> Result<Option<KnowledgeItem>> {
    let item = conn
        .query_row(
            &format!("SELECT {KNOWLEDGE_COLUMNS} FROM knowledge WHERE id = ?1"),
            params![id],
            knowledge_from_row,
        )
        .optional()?;
    Ok(item)
}

/// Set `verified` and `validation_feedback` on one item. Returns `false` when
/// no row has that id.
pub fn set_verification(
    conn: &Connection,
    id: &str,
    approved: bool,
    feedback: Option<&str>,
) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE knowledge SET verified = ?1, validation_feedback = ?2 WHERE id = ?3",
        params![approved, feedback, id],
    )?;
    Ok(rows > 0)
}

/// Insert a learned-concept record as-is.
pub fn insert_concept(conn: &Connection, concept: &ConceptLearned) -> Result<()> {
    conn.execute(
        "INSERT INTO concepts (id, concept, definition, verified, learned_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            concept.id,
            concept.concept,
            concept.definition,
            concept.verified,
            format_timestamp(&concept.learned_at),
        ],
    )?;
    Ok(())
}

/// All learned concepts in insertion order, at most `limit`.
pub fn list_concepts(conn: &Connection, limit: usize) -> Result<Vec<ConceptLearned>> {
    let mut stmt = conn.prepare(
        "SELECT id, concept, definition, verified, learned_at FROM concepts ORDER BY rowid LIMIT ?1",
    )?;
    let concepts = stmt
        .query_map(params![limit as i64], |row| {
            let learned_at: String = row.get(4)?;
            Ok(ConceptLearned {
                id: row.get(0)?,
                concept: row.get(1)?,
                definition: row.get(2)?,
                verified: row.get(3)?,
                learned_at: parse_timestamp(4, &learned_at)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(concepts)
}

/// Persist one extracted pair as a verified, user-taught knowledge item plus
/// its concept record. Both rows commit together or not at all.
pub fn record_learned_concept(
    conn: &mut Connection,
    extracted: &ExtractedConcept,
) -> Result<(KnowledgeItem, ConceptLearned)> {
    let knowledge = KnowledgeItem::taught(&extracted.concept, &extracted.definition);
    let concept = ConceptLearned {
        id: super::types::new_id(),
        concept: extracted.concept.clone(),
        definition: extracted.definition.clone(),
        verified: true,
        learned_at: knowledge.created_at,
    };

    let tx = conn.transaction()?;
    insert_knowledge(&tx, &knowledge)?;
    insert_concept(&tx, &concept)?;
    tx.commit()?;

    Ok((knowledge, concept))
}

fn knowledge_from_row(row: &Row<'_>) -> rusqlite::Result<KnowledgeItem> {
    let source: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    Ok(KnowledgeItem {
        id: row.get(0)?,
        concept: row.get(1)?,
        definition: row.get(2)?,
        verified: row.get(3)?,
        source: parse_enum(4, &source)?,
        created_at: parse_timestamp(5, &created_at)?,
        confidence_score: row.get(6)?,
        validation_feedback: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::knowledge::types::KnowledgeSource;

    fn extracted(concept: &str, definition: &str) -> ExtractedConcept {
        ExtractedConcept {
            concept: concept.into(),
            definition: definition.into(),
        }
    }

    #[test]
    fn insert_and_get_knowledge() {
        let conn = db::open_memory_database().unwrap();
        let mut item = KnowledgeItem::taught("Photosynthesis", "Plants turning light into sugar");
        item.source = KnowledgeSource::Internet;
        item.confidence_score = 70;
        insert_knowledge(&conn, &item).unwrap();

        let fetched = get_knowledge(&conn, &item.id).unwrap().unwrap();
        assert_eq!(fetched.concept, "Photosynthesis");
        assert_eq!(fetched.source, KnowledgeSource::Internet);
        assert_eq!(fetched.confidence_score, 70);
        assert_eq!(
            fetched.created_at.timestamp_micros(),
            item.created_at.timestamp_micros()
        );
    }

    #[test]
    fn get_unknown_knowledge_is_none() {
        let conn = db::open_memory_database().unwrap();
        assert!(get_knowledge(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn list_knowledge_keeps_insertion_order_and_limit() {
        let conn = db::open_memory_database().unwrap();
        for name in ["b", "a", "c"] {
            insert_knowledge(&conn, &KnowledgeItem::taught(name, "def")).unwrap();
        }
        let names: Vec<String> = list_knowledge(&conn, LIST_LIMIT)
            .unwrap()
            .into_iter()
            .map(|k| k.concept)
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(list_knowledge(&conn, 2).unwrap().len(), 2);
    }

    #[test]
    fn set_verification_updates_only_target() {
        let conn = db::open_memory_database().unwrap();
        let a = KnowledgeItem::taught("A", "first");
        let b = KnowledgeItem::taught("B", "second");
        insert_knowledge(&conn, &a).unwrap();
        insert_knowledge(&conn, &b).unwrap();

        assert!(set_verification(&conn, &a.id, false, Some("wrong")).unwrap());

        let a2 = get_knowledge(&conn, &a.id).unwrap().unwrap();
        let b2 = get_knowledge(&conn, &b.id).unwrap().unwrap();
        assert!(!a2.verified);
        assert_eq!(a2.validation_feedback.as_deref(), Some("wrong"));
        assert!(b2.verified);
        assert!(b2.validation_feedback.is_none());
    }

    #[test]
    fn set_verification_on_missing_id_reports_false() {
        let conn = db::open_memory_database().unwrap();
        assert!(!set_verification(&conn, "nope", true, None).unwrap());
    }

    #[test]
    fn record_learned_concept_writes_both_rows() {
        let mut conn = db::open_memory_database().unwrap();
        let (knowledge, concept) =
            record_learned_concept(&mut conn, &extracted("Gravity", "Pulls things")).unwrap();

        assert!(knowledge.verified);
        assert_eq!(knowledge.source, KnowledgeSource::TaughtByUser);
        assert_eq!(concept.concept, "Gravity");

        assert_eq!(list_knowledge(&conn, LIST_LIMIT).unwrap().len(), 1);
        assert_eq!(list_concepts(&conn, LIST_LIMIT).unwrap().len(), 1);
    }

    #[test]
    fn record_learned_concept_rolls_back_on_failure() {
        let mut conn = db::open_memory_database().unwrap();
        conn.execute_batch("DROP TABLE concepts").unwrap();

        assert!(record_learned_concept(&mut conn, &extracted("X", "Y")).is_err());
        // knowledge insert was rolled back with the failed concept insert
        assert!(list_knowledge(&conn, LIST_LIMIT).unwrap().is_empty());
    }

    #[test]
    fn duplicate_concepts_are_not_merged() {
        let mut conn = db::open_memory_database().unwrap();
        record_learned_concept(&mut conn, &extracted("Same", "one")).unwrap();
        record_learned_concept(&mut conn, &extracted("Same", "two")).unwrap();
        assert_eq!(list_concepts(&conn, LIST_LIMIT).unwrap().len(), 2);
    }
}
