use anyhow::Result;

use crate::config::MonoqueConfig;
use crate::knowledge::types::Phase;

/// Display knowledge base statistics in the terminal.
pub fn stats(config: &MonoqueConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    // The phase lives in the server process; a fresh process starts offline.
    let response = crate::knowledge::stats::system_stats(&conn, Phase::default())?;

    println!("Knowledge Base Statistics");
    println!("{}", "=".repeat(40));
    println!("  Concepts learned:    {}", response.total_concepts);
    println!("  Chat sessions:       {}", response.total_sessions);
    println!("  Chat messages:       {}", response.total_messages);
    println!();

    println!("Knowledge by source:");
    println!("  {:<12} {}", "taught", response.verified_knowledge);
    println!("  {:<12} {}", "internet", response.internet_knowledge);

    Ok(())
}
