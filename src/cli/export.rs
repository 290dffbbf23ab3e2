use anyhow::Result;

use crate::config::MonoqueConfig;

/// Export knowledge, concepts and version log as JSON to stdout.
pub fn export(config: &MonoqueConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    let archive = crate::knowledge::archive::export_archive(&conn)?;

    let json = serde_json::to_string_pretty(&archive)?;
    println!("{json}");

    eprintln!(
        "Exported {} knowledge items, {} concepts and {} versions.",
        archive.knowledge.len(),
        archive.concepts.len(),
        archive.versions.len()
    );

    Ok(())
}
