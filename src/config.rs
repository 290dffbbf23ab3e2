use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MonoqueConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Allowed CORS origins. `"*"` allows any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Request timeout for the remote model. 0 disables the client timeout.
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    pub history_limit: usize,
    pub forward_history: bool,
    pub session_transcript_limit: usize,
}

impl Default for MonoqueConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            llm: LlmConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8001,
            log_level: "info".into(),
            cors_origins: vec!["*".into()],
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_monoque_dir()
            .join("monoque.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o".into(),
            api_key: None,
            timeout_secs: 0,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: 20,
            forward_history: false,
            session_transcript_limit: 50,
        }
    }
}

/// Returns `~/.monoque/`, or `./.monoque` when no home directory is known.
pub fn default_monoque_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".monoque")
}

/// Returns the default config file path: `~/.monoque/config.toml`
pub fn default_config_path() -> PathBuf {
    default_monoque_dir().join("config.toml")
}

impl MonoqueConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MonoqueConfig::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `MONOQUE_*` environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("MONOQUE_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("MONOQUE_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("MONOQUE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("MONOQUE_PORT") {
            self.server.port = val
                .parse()
                .with_context(|| format!("MONOQUE_PORT is not a valid port: {val}"))?;
        }
        if let Ok(val) = std::env::var("MONOQUE_CORS_ORIGINS") {
            self.server.cors_origins = parse_origins(&val);
        }
        if let Ok(val) = std::env::var("MONOQUE_LLM_API_KEY") {
            self.llm.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("MONOQUE_LLM_BASE_URL") {
            self.llm.base_url = val;
        }
        if let Ok(val) = std::env::var("MONOQUE_LLM_MODEL") {
            self.llm.model = val;
        }
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// `host:port` string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
