//! Conversation pipeline: persist the user turn, ask the model, persist the
//! reply, and record any concepts the reply teaches.
//!
//! Writes are independent: a failed model call leaves the user message stored,
//! and a failed concept write leaves the assistant reply stored. Each concept's
//! knowledge + concept records commit together.

pub mod session;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::ChatConfig;
use crate::db::{with_conn, SharedDb};
use crate::knowledge::extract::extract_concepts;
use crate::knowledge::messages::{recent_messages, save_message};
use crate::knowledge::store::record_learned_concept;
use crate::knowledge::types::{new_id, ExtractedConcept, Role};
use crate::llm::Message;
use session::SessionManager;

/// Body of `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub concepts_learned: Vec<ExtractedConcept>,
    /// Reserved for reviewer sign-off; currently always `false`.
    pub validation_needed: bool,
}

/// Run one chat exchange.
pub async fn handle_chat(
    db: &SharedDb,
    sessions: &SessionManager,
    config: &ChatConfig,
    request: ChatRequest,
) -> Result<ChatResponse> {
    let session = sessions.session().await;

    let session_id = request
        .session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(new_id);

    tracing::info!(
        session_id = %session_id,
        message_len = request.message.len(),
        phase = %session.phase(),
        "chat request"
    );

    let saved = {
        let session_id = session_id.clone();
        let message = request.message.clone();
        with_conn(db, move |conn| save_message(conn, &session_id, Role::User, &message, None))
            .await?
    };

    // Concurrent requests on the same session may interleave, so drop this
    // turn by id rather than by position.
    let mut history = {
        let session_id = session_id.clone();
        let limit = config.history_limit;
        with_conn(db, move |conn| recent_messages(conn, &session_id, limit)).await?
    };
    history.retain(|m| m.id != saved.id);
    tracing::debug!(session_id = %session_id, prior_messages = history.len(), "history loaded");

    let context: Option<Vec<Message>> = config.forward_history.then(|| {
        history
            .into_iter()
            .map(|m| Message {
                role: m.role,
                content: m.content,
            })
            .collect()
    });

    let reply = session
        .send_message(&request.message, context.as_deref())
        .await?;

    {
        let session_id = session_id.clone();
        let reply = reply.clone();
        with_conn(db, move |conn| save_message(conn, &session_id, Role::Assistant, &reply, None))
            .await?;
    }

    let concepts = extract_concepts(&reply);
    if !concepts.is_empty() {
        let to_store = concepts.clone();
        with_conn(db, move |conn| {
            for concept in &to_store {
                record_learned_concept(conn, concept)?;
            }
            Ok(())
        })
        .await?;
        tracing::info!(session_id = %session_id, count = concepts.len(), "concepts learned");
    }

    Ok(ChatResponse {
        response: reply,
        session_id,
        concepts_learned: concepts,
        validation_needed: false,
    })
}
