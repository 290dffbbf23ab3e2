//! Scripted backend for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{LlmBackend, LlmError, Message};

/// A call captured by [`ScriptedBackend`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub messages: Vec<Message>,
}

/// Backend that replays queued replies (falling back to a default reply) and
/// records every call.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, String>>>,
    default_reply: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: default_reply.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.lock_replies().push_back(Ok(reply.into()));
    }

    /// Queue a failure.
    pub fn push_failure(&self, reason: impl Into<String>) {
        self.lock_replies().push_back(Err(reason.into()));
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, String>>> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new("Mock response")
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCall {
                system_prompt: system_prompt.to_string(),
                messages: messages.to_vec(),
            });

        match self.lock_replies().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => Err(LlmError::Unavailable(reason)),
            None => Ok(self.default_reply.clone()),
        }
    }
}
