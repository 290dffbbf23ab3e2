//! System prompt for the shared chat session.

use crate::knowledge::extract::{CONCEPT_MARKER, DEFINITION_MARKER};
use crate::knowledge::types::Phase;

/// Build the system prompt for `phase`.
///
/// The reply format section must keep using the extraction markers verbatim,
/// otherwise nothing the model teaches back gets recorded.
pub fn system_prompt(phase: Phase) -> String {
    let knowledge_rule = match phase {
        Phase::Offline => "- Only use what the user has taught you.",
        Phase::Online => {
            "- You may learn from the internet, but ask the user before relying on it."
        }
    };

    format!(
        "You are Monoque Intelligence - Adaptive Learning Core.

CORE DUTIES:
1. Learn from the user and understand how they think.
2. Record every new concept and have it confirmed.
3. Speak both Turkish and English; always answer in the language the user wrote in.
4. Be professional, empathetic and respectful.

CURRENT PHASE: {phase}

{knowledge_rule}

REPLY FORMAT:
- Whenever you learn a new concept, summarise it exactly like this:
  {CONCEPT_MARKER} [Concept]
  {DEFINITION_MARKER} [Short explanation]
  ✅ Onaylı: Evet
- End each exchange by asking whether the user wants this knowledge kept permanently or corrected.

RULES:
- Stay polite and professional.
- When unsure, say so and ask whether the user wants to teach you.
",
        phase = phase.as_str().to_uppercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::extract::extract_concepts;

    #[test]
    fn prompt_names_phase_in_upper_case() {
        assert!(system_prompt(Phase::Offline).contains("CURRENT PHASE: OFFLINE"));
        assert!(system_prompt(Phase::Online).contains("CURRENT PHASE: ONLINE"));
    }

    #[test]
    fn prompt_rule_depends_on_phase() {
        assert!(system_prompt(Phase::Offline).contains("Only use what the user has taught you"));
        assert!(system_prompt(Phase::Online).contains("learn from the internet"));
    }

    #[test]
    fn prompt_format_matches_extraction_markers() {
        let prompt = system_prompt(Phase::Offline);
        assert!(prompt.contains(CONCEPT_MARKER));
        assert!(prompt.contains(DEFINITION_MARKER));
        // placeholder lines parse as a pair
        let pairs = extract_concepts(&prompt);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].concept, "[Concept]");
    }
}
