//! Remote language-model backends.
//!
//! Provides the [`LlmBackend`] trait, an OpenAI-compatible implementation
//! ([`openai::OpenAiBackend`]), a scripted backend for tests
//! ([`mock::ScriptedBackend`]), and the phase-dependent system prompt. The
//! backend is created via [`create_backend`] from configuration.

pub mod mock;
pub mod openai;
pub mod prompt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::knowledge::types::Role;

/// Errors surfaced by a backend call.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key configured for a backend that needs one
    #[error("LLM API key not configured (set MONOQUE_LLM_API_KEY)")]
    MissingApiKey,

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the provider
    #[error("provider returned HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// Response body could not be understood
    #[error("parse error: {0}")]
    Parse(String),

    /// Backend refused the request
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// One conversational turn sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat-completion provider: system prompt plus turns in, reply text out.
///
/// Calls may be slow and may fail; callers add no retry.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Backend identifier (usually the model name).
    fn id(&self) -> &str;

    /// Generate the assistant reply to `messages`, the last of which is the
    /// user's new message.
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String, LlmError>;
}

/// Create a backend from config.
///
/// Currently only `"openai"` (any OpenAI-compatible endpoint) is supported. A
/// missing API key is not an error here; it surfaces on the first call.
pub fn create_backend(config: &crate::config::LlmConfig) -> Result<Arc<dyn LlmBackend>> {
    match config.provider.as_str() {
        "openai" => {
            let backend = openai::OpenAiBackend::from_config(config)?;
            Ok(Arc::new(backend))
        }
        other => anyhow::bail!("unknown LLM provider: {other}. Supported: openai"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;

    #[test]
    fn create_backend_uses_configured_model() {
        let backend = create_backend(&LlmConfig::default()).unwrap();
        assert_eq!(backend.id(), "gpt-4o");
    }

    #[test]
    fn create_backend_rejects_unknown_provider() {
        let config = LlmConfig {
            provider: "carrier-pigeon".into(),
            ..LlmConfig::default()
        };
        let err = create_backend(&config).err().unwrap();
        assert!(err.to_string().contains("unknown LLM provider"));
    }
}
