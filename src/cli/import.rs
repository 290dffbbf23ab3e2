use anyhow::{Context, Result};
use std::path::Path;

use crate::config::MonoqueConfig;
use crate::knowledge::archive::{import_archive, Archive};

/// Import an archive produced by `monoque export`. Existing ids are skipped.
pub fn import(config: &MonoqueConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let archive: Archive =
        serde_json::from_str(&json).context("failed to parse import JSON")?;

    let db_path = config.resolved_db_path();
    let mut conn = crate::db::open_database(&db_path)?;

    println!(
        "Importing {} knowledge items, {} concepts and {} versions...",
        archive.knowledge.len(),
        archive.concepts.len(),
        archive.versions.len()
    );

    let summary = import_archive(&mut conn, &archive)?;

    println!("Import complete:");
    println!("  Knowledge imported: {}", summary.knowledge_imported);
    println!("  Concepts imported:  {}", summary.concepts_imported);
    println!("  Versions imported:  {}", summary.versions_imported);
    if summary.skipped > 0 {
        println!("  Skipped:            {} (already exist)", summary.skipped);
    }

    Ok(())
}
