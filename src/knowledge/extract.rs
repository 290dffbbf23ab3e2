//! Concept extraction from assistant replies.
//!
//! The system prompt asks the model to summarise every newly taught concept as
//! a marker line followed by a definition line:
//!
//! ```text
//! 🧩 Yeni Öğrenilen: Gravity
//! 💬 Tanım: Force pulling objects together
//! ```
//!
//! [`extract_concepts`] walks the reply line by line through an explicit
//! two-state machine ([`ExtractState`]) and never fails; text without markers
//! yields an empty list.

use super::types::ExtractedConcept;

/// Marks the line carrying a newly learned concept name.
pub const CONCEPT_MARKER: &str = "🧩 Yeni Öğrenilen:";

/// Marks the line carrying the definition of the pending concept.
pub const DEFINITION_MARKER: &str = "💬 Tanım:";

/// Scanner state between lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractState {
    /// No concept name is pending.
    AwaitingConcept,
    /// A non-empty concept name is waiting for its definition.
    AwaitingDefinition { concept: String },
}

/// What a single line means to the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Concept(&'a str),
    Definition(&'a str),
    Other,
}

impl<'a> LineKind<'a> {
    /// Classify a line. A line carrying both markers counts as a concept line.
    pub fn classify(line: &'a str) -> Self {
        if let Some(payload) = payload_after(line, CONCEPT_MARKER) {
            Self::Concept(payload)
        } else if let Some(payload) = payload_after(line, DEFINITION_MARKER) {
            Self::Definition(payload)
        } else {
            Self::Other
        }
    }
}

impl ExtractState {
    /// Advance by one line, returning a pair when a definition completes one.
    ///
    /// Concept lines overwrite any pending name (last one wins). Empty payloads
    /// never produce a pair: an empty concept clears the pending name, an empty
    /// definition leaves it pending.
    pub fn step(self, line: LineKind<'_>) -> (Self, Option<ExtractedConcept>) {
        match (self, line) {
            (_, LineKind::Concept(name)) if name.is_empty() => (Self::AwaitingConcept, None),
            (_, LineKind::Concept(name)) => (
                Self::AwaitingDefinition {
                    concept: name.to_string(),
                },
                None,
            ),
            (Self::AwaitingDefinition { concept }, LineKind::Definition(def)) if !def.is_empty() => (
                Self::AwaitingConcept,
                Some(ExtractedConcept {
                    concept,
                    definition: def.to_string(),
                }),
            ),
            (state, _) => (state, None),
        }
    }
}

/// Extract every `{concept, definition}` pair from `text`, in order.
pub fn extract_concepts(text: &str) -> Vec<ExtractedConcept> {
    let mut concepts = Vec::new();
    let mut state = ExtractState::AwaitingConcept;

    for line in text.lines() {
        let (next, emitted) = state.step(LineKind::classify(line));
        state = next;
        if let Some(pair) = emitted {
            concepts.push(pair);
        }
    }

    concepts
}

/// Trimmed text after the first `marker`, stopping at a repeated marker.
fn payload_after<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let (_, rest) = line.split_once(marker)?;
    let payload = match rest.find(marker) {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(payload.trim())
}
