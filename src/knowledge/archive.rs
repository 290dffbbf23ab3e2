//! JSON export/import of the knowledge base.
//!
//! Chat history is not part of an archive. Import skips any document whose id
//! already exists, so importing the same file twice is a no-op.

use anyhow::Result;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::store::{insert_concept, insert_knowledge, list_concepts, list_knowledge};
use super::types::{ConceptLearned, KnowledgeItem, ModelVersion};
use super::versions::{add_version, list_versions};

/// Row limit for full exports.
const NO_LIMIT: usize = i64::MAX as usize;

/// Export format.
#[derive(Debug, Serialize, Deserialize)]
pub struct Archive {
    pub knowledge: Vec<KnowledgeItem>,
    #[serde(default)]
    pub concepts: Vec<ConceptLearned>,
    #[serde(default)]
    pub versions: Vec<ModelVersion>,
}

/// Counts reported by [`import_archive`].
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub knowledge_imported: u64,
    pub concepts_imported: u64,
    pub versions_imported: u64,
    pub skipped: u64,
}

/// Snapshot every knowledge item, concept and version entry.
pub fn export_archive(conn: &Connection) -> Result<Archive> {
    Ok(Archive {
        knowledge: list_knowledge(conn, NO_LIMIT)?,
        concepts: list_concepts(conn, NO_LIMIT)?,
        versions: list_versions(conn, NO_LIMIT)?,
    })
}

/// Insert archive documents whose ids are not already present, in one transaction.
pub fn import_archive(conn: &mut Connection, archive: &Archive) -> Result<ImportSummary> {
    let tx = conn.transaction()?;
    let mut summary = ImportSummary::default();

    for item in &archive.knowledge {
        if exists(&tx, "knowledge", &item.id)? {
            summary.skipped += 1;
            continue;
        }
        insert_knowledge(&tx, item)?;
        summary.knowledge_imported += 1;
    }

    for concept in &archive.concepts {
        if exists(&tx, "concepts", &concept.id)? {
            summary.skipped += 1;
            continue;
        }
        insert_concept(&tx, concept)?;
        summary.concepts_imported += 1;
    }

    for version in &archive.versions {
        if exists(&tx, "versions", &version.id)? {
            summary.skipped += 1;
            continue;
        }
        add_version(&tx, version)?;
        summary.versions_imported += 1;
    }

    tx.commit()?;
    Ok(summary)
}

fn exists(conn: &Connection, table: &str, id: &str) -> Result<bool> {
    let found: bool = conn.query_row(
        &format!("SELECT COUNT(*) > 0 FROM {table} WHERE id = ?1"),
        params![id],
        |row| row.get(0),
    )?;
    Ok(found)
}
