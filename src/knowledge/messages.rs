//! Chat message history, partitioned by session id and ordered by timestamp.

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, Row};

use super::types::{format_timestamp, new_id, parse_enum, parse_timestamp, ChatMessage, Role};

const MESSAGE_COLUMNS: &str = "id, session_id, role, content, timestamp, metadata";

/// Append a message to a session. Metadata defaults to an empty object.
pub fn save_message(
    conn: &Connection,
    session_id: &str,
    role: Role,
    content: &str,
    metadata: Option<serde_json::Value>,
) -> Result<ChatMessage> {
    let message = ChatMessage {
        id: new_id(),
        session_id: session_id.to_string(),
        role,
        content: content.to_string(),
        timestamp: Utc::now(),
        metadata: Some(metadata.unwrap_or_else(|| serde_json::json!({}))),
    };

    let metadata_json = message
        .metadata
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO messages (id, session_id, role, content, timestamp, metadata) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            message.id,
            message.session_id,
            message.role.as_str(),
            message.content,
            format_timestamp(&message.timestamp),
            metadata_json,
        ],
    )?;

    Ok(message)
}

/// The `limit` most recent messages of a session, returned oldest first.
pub fn recent_messages(conn: &Connection, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ?1 \
         ORDER BY timestamp DESC, rowid DESC LIMIT ?2"
    ))?;
    let mut messages = stmt
        .query_map(params![session_id, limit as i64], message_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    messages.reverse();
    Ok(messages)
}

/// A session's messages oldest first, at most `limit`.
pub fn session_messages(conn: &Connection, session_id: &str, limit: usize) -> Result<Vec<ChatMessage>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ?1 \
         ORDER BY timestamp ASC, rowid ASC LIMIT ?2"
    ))?;
    let messages = stmt
        .query_map(params![session_id, limit as i64], message_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(messages)
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    let role: String = row.get(2)?;
    let timestamp: String = row.get(4)?;
    let metadata: Option<String> = row.get(5)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: parse_enum(2, &role)?,
        content: row.get(3)?,
        timestamp: parse_timestamp(4, &timestamp)?,
        metadata: metadata.and_then(|s| serde_json::from_str(&s).ok()),
    })
}
