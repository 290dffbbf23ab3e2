//! Document types for the knowledge base.
//!
//! Defines [`KnowledgeItem`], [`ConceptLearned`], [`ChatMessage`] and
//! [`ModelVersion`] (one per stored collection), the [`KnowledgeSource`] and
//! [`Role`] enums, the process [`Phase`], and timestamp helpers shared by the
//! row mappers.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Where a knowledge item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KnowledgeSource {
    /// Taught directly by the user in conversation.
    #[default]
    #[serde(rename = "Enver", alias = "taught-by-user")]
    TaughtByUser,
    /// Learned from the internet while in the online phase.
    #[serde(rename = "Internet", alias = "internet")]
    Internet,
}

impl KnowledgeSource {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaughtByUser => "Enver",
            Self::Internet => "Internet",
        }
    }
}

impl std::fmt::Display for KnowledgeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KnowledgeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Enver" | "taught-by-user" => Ok(Self::TaughtByUser),
            "Internet" | "internet" => Ok(Self::Internet),
            _ => Err(format!("unknown knowledge source: {s}")),
        }
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Operating mode selecting the system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Only use what the user has taught.
    #[default]
    Offline,
    /// May learn from the internet, after asking the user.
    Online,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Online => "online",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offline" => Ok(Self::Offline),
            "online" => Ok(Self::Online),
            _ => Err("Phase must be 'offline' or 'online'".to_string()),
        }
    }
}

/// A concept/definition pair with trust and attribution, matching the
/// `knowledge` table.
///
/// Every field except `concept` and `definition` has a default, so clients
/// can post a bare pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    #[serde(default = "new_id")]
    pub id: String,
    pub concept: String,
    pub definition: String,
    #[serde(default = "default_true")]
    pub verified: bool,
    #[serde(default)]
    pub source: KnowledgeSource,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Trust score in `0..=100`.
    #[serde(default = "default_confidence")]
    pub confidence_score: u8,
    /// Reviewer note left by the last validation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_feedback: Option<String>,
}

impl KnowledgeItem {
    /// A verified, user-taught item with full confidence.
    pub fn taught(concept: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            concept: concept.into(),
            definition: definition.into(),
            verified: true,
            source: KnowledgeSource::TaughtByUser,
            created_at: Utc::now(),
            confidence_score: 100,
            validation_feedback: None,
        }
    }
}

/// A concept picked out of an assistant reply, matching the `concepts` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptLearned {
    #[serde(default = "new_id")]
    pub id: String,
    pub concept: String,
    pub definition: String,
    pub verified: bool,
    #[serde(default = "Utc::now")]
    pub learned_at: DateTime<Utc>,
}

/// One turn of a conversation, matching the `messages` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
}

/// An entry in the model version log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    #[serde(default = "new_id")]
    pub id: String,
    pub version: String,
    pub description: String,
    pub changes: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// A `{concept, definition}` pair found in reply text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedConcept {
    pub concept: String,
    pub definition: String,
}

/// Fresh UUID v4 string for client-facing document ids.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

fn default_confidence() -> u8 {
    100
}

/// Fixed-width RFC 3339 (`2024-01-01T00:00:00.000000Z`) so text order is time order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC 3339 string read from column `idx`.
pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Parse an enum column via its `FromStr` impl.
pub(crate) fn parse_enum<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}
