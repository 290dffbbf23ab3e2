//! The shared remote chat session and the phase that shapes it.
//!
//! [`SessionManager`] owns the process-wide [`Phase`] and the live
//! [`ChatSession`] behind one async mutex: sessions are created lazily,
//! at most one at a time, and every phase change discards the live session so
//! the next chat starts over with the new system prompt.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::knowledge::types::Phase;
use crate::llm::prompt::system_prompt;
use crate::llm::{LlmBackend, LlmError, Message};

/// A persistent conversation with the remote model.
///
/// Keeps its own transcript so consecutive calls see earlier turns, emulating
/// a stateful remote session on top of a stateless completions API. The
/// transcript is shared by every caller of this session.
pub struct ChatSession {
    backend: Arc<dyn LlmBackend>,
    phase: Phase,
    system_prompt: String,
    transcript: Mutex<Vec<Message>>,
    transcript_limit: usize,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn LlmBackend>, phase: Phase, transcript_limit: usize) -> Self {
        Self {
            backend,
            phase,
            system_prompt: system_prompt(phase),
            transcript: Mutex::new(Vec::new()),
            transcript_limit,
        }
    }

    /// Phase this session was created for.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Send `text` and return the reply.
    ///
    /// With `history` the call uses exactly those turns as context and leaves
    /// the shared transcript alone. Without it the transcript is the context
    /// and the exchange is appended on success. The transcript lock is not held
    /// across the remote call.
    pub async fn send_message(
        &self,
        text: &str,
        history: Option<&[Message]>,
    ) -> Result<String, LlmError> {
        let user = Message::user(text);

        let Some(history) = history else {
            let mut turns = self.transcript.lock().await.clone();
            turns.push(user.clone());

            let reply = self.backend.complete(&self.system_prompt, &turns).await?;

            let mut transcript = self.transcript.lock().await;
            transcript.push(user);
            transcript.push(Message::assistant(reply.clone()));
            // Drop whole user/assistant pairs so the transcript opens on a user turn.
            if transcript.len() > self.transcript_limit {
                let excess = (transcript.len() - self.transcript_limit).next_multiple_of(2);
                let len = transcript.len();
                transcript.drain(..excess.min(len));
            }
            return Ok(reply);
        };

        let mut turns = history.to_vec();
        turns.push(user);
        self.backend.complete(&self.system_prompt, &turns).await
    }

    /// Number of turns currently remembered.
    pub async fn transcript_len(&self) -> usize {
        self.transcript.lock().await.len()
    }
}

struct SessionState {
    phase: Phase,
    session: Option<Arc<ChatSession>>,
}

/// Owner of the phase flag and the live chat session.
pub struct SessionManager {
    backend: Arc<dyn LlmBackend>,
    transcript_limit: usize,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn LlmBackend>, transcript_limit: usize) -> Self {
        Self {
            backend,
            transcript_limit,
            state: Mutex::new(SessionState {
                phase: Phase::default(),
                session: None,
            }),
        }
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    /// Switch phase and drop the live session. In-flight requests keep the
    /// session they already hold.
    pub async fn set_phase(&self, phase: Phase) {
        let mut state = self.state.lock().await;
        let previous = state.phase;
        state.phase = phase;
        state.session = None;
        tracing::info!(from = %previous, to = %phase, "phase updated, chat session reset");
    }

    /// The live session, created for the current phase if there is none.
    pub async fn session(&self) -> Arc<ChatSession> {
        let mut state = self.state.lock().await;
        let phase = state.phase;
        let session = state.session.get_or_insert_with(|| {
            tracing::info!(phase = %phase, backend = self.backend.id(), "creating chat session");
            Arc::new(ChatSession::new(
                Arc::clone(&self.backend),
                phase,
                self.transcript_limit,
            ))
        });
        Arc::clone(session)
    }

    /// Whether a session is currently live.
    pub async fn has_session(&self) -> bool {
        self.state.lock().await.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::types::Role;
    use crate::llm::mock::ScriptedBackend;

    fn manager() -> (Arc<ScriptedBackend>, SessionManager) {
        let backend = Arc::new(ScriptedBackend::new("ok"));
        let manager = SessionManager::new(backend.clone(), 4);
        (backend, manager)
    }

    #[tokio::test]
    async fn session_is_created_lazily_and_reused() {
        let (_, manager) = manager();
        assert!(!manager.has_session().await);

        let a = manager.session().await;
        let b = manager.session().await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.phase(), Phase::Offline);
    }

    #[tokio::test]
    async fn set_phase_discards_session() {
        let (_, manager) = manager();
        let before = manager.session().await;

        manager.set_phase(Phase::Online).await;
        assert!(!manager.has_session().await);
        assert_eq!(manager.phase().await, Phase::Online);

        let after = manager.session().await;
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.phase(), Phase::Online);
        assert!(after.system_prompt().contains("ONLINE"));
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_session() {
        let (_, manager) = manager();
        let manager = Arc::new(manager);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = Arc::clone(&manager);
                tokio::spawn(async move { m.session().await })
            })
            .collect();

        let mut sessions = Vec::new();
        for h in handles {
            sessions.push(h.await.unwrap());
        }
        assert!(sessions.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn transcript_carries_earlier_turns() {
        let (backend, manager) = manager();
        let session = manager.session().await;

        session.send_message("first", None).await.unwrap();
        session.send_message("second", None).await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        let contents: Vec<&str> = calls[1].messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "ok", "second"]);
        assert_eq!(calls[1].messages[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn transcript_is_capped() {
        let (_, manager) = manager();
        let session = manager.session().await;
        for i in 0..5 {
            session.send_message(&format!("m{i}"), None).await.unwrap();
        }
        assert_eq!(session.transcript_len().await, 4);
    }

    #[tokio::test]
    async fn odd_cap_trims_whole_exchanges() {
        let backend = Arc::new(ScriptedBackend::new("ok"));
        let manager = SessionManager::new(backend.clone(), 3);
        let session = manager.session().await;
        for i in 0..3 {
            session.send_message(&format!("m{i}"), None).await.unwrap();
        }
        session.send_message("last", None).await.unwrap();

        let call = backend.calls().pop().unwrap();
        assert_eq!(call.messages[0].role, Role::User);
        assert_eq!(call.messages[0].content, "m2");
        assert_eq!(session.transcript_len().await, 2);
    }

    #[tokio::test]
    async fn explicit_history_bypasses_transcript() {
        let (backend, manager) = manager();
        let session = manager.session().await;
        let history = vec![Message::user("earlier"), Message::assistant("reply")];

        session.send_message("now", Some(&history)).await.unwrap();

        assert_eq!(session.transcript_len().await, 0);
        let call = &backend.calls()[0];
        assert_eq!(call.messages.len(), 3);
        assert_eq!(call.messages[2].content, "now");
    }

    #[tokio::test]
    async fn failed_call_leaves_transcript_untouched() {
        let (backend, manager) = manager();
        backend.push_failure("down");
        let session = manager.session().await;

        assert!(session.send_message("hi", None).await.is_err());
        assert_eq!(session.transcript_len().await, 0);
    }
}
