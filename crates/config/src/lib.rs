//! Configuration loading and validation for the Jamespot agent.
//!
//! Values come from three layers, later ones winning:
//! built-in defaults, the optional `~/.jamespot-agent/config.toml`, and the
//! process environment (which the CLI seeds from `.env` before loading).
//! Nothing here talks to the network; per-provider requirements are checked
//! when the provider is built.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Target platform and credentials
    #[serde(default)]
    pub backend: BackendConfig,

    /// LLM provider selection and model parameters
    #[serde(default)]
    pub llm: LlmConfig,

    /// Conversation loop settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Image search (Unsplash) settings
    #[serde(default)]
    pub image_search: ImageSearchConfig,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the platform, e.g. `https://acme.jamespot.pro`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Pre-established session token, sent along with the sign-in call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Session credentials, resolved and checked.
#[derive(Clone)]
pub struct Credentials {
    pub backend_url: String,
    pub email: String,
    pub password: String,
    pub token: Option<String>,
}

impl BackendConfig {
    /// Resolve the credentials needed to log in.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let required = |value: &Option<String>, var: &'static str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(ConfigError::Missing(var))
        };

        Ok(Credentials {
            backend_url: required(&self.url, "JAMESPOT_URL")?.trim_end_matches('/').to_string(),
            email: required(&self.email, "JAMESPOT_EMAIL")?,
            password: required(&self.password, "JAMESPOT_PASSWORD")?,
            token: self.token.clone().filter(|t| !t.is_empty()),
        })
    }
}

/// Which chat-completion backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// OpenAI's hosted API
    #[default]
    OpenAi,
    /// Safebrain's OpenAI-compatible, per-bot endpoint
    Safebrain,
    /// Anthropic's Messages API
    Anthropic,
}

impl LlmProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Safebrain => "safebrain",
            Self::Anthropic => "anthropic",
        }
    }
}

impl std::fmt::Display for LlmProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LlmProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "openai" => Ok(Self::OpenAi),
            "safebrain" => Ok(Self::Safebrain),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(ConfigError::ValidationError(format!(
                "Unsupported LLM provider: {other} (expected openai, safebrain or anthropic)"
            ))),
        }
    }
}

/// LLM configuration. Immutable once the provider is built.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProviderKind,

    /// Model name; each provider has its own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Safebrain instance host, with or without scheme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            model: None,
            temperature: 0.0,
            max_tokens: None,
            api_key: None,
            base_url: None,
            instance: None,
            bot_id: None,
            group_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Seeded as the first transcript message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// LLM roundtrips allowed per turn
    #[serde(default = "default_max_roundtrips")]
    pub max_roundtrips: u32,

    /// Verbose tool and provider tracing
    #[serde(default)]
    pub debug: bool,
}

fn default_max_roundtrips() -> u32 {
    25
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            system_prompt: None,
            max_roundtrips: default_max_roundtrips(),
            debug: false,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ImageSearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsplash_access_key: Option<String>,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("email", &self.email)
            .field("password", &redact(&self.password))
            .field("token", &redact(&self.token))
            .finish()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("backend_url", &self.backend_url)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("token", &redact(&self.token))
            .finish()
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("instance", &self.instance)
            .field("bot_id", &self.bot_id)
            .field("group_id", &self.group_id)
            .finish()
    }
}

impl std::fmt::Debug for ImageSearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSearchConfig")
            .field("unsplash_access_key", &redact(&self.unsplash_access_key))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default file, then apply the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_dir().join("config.toml"))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment lookup.
    ///
    /// Empty variables are ignored. Provider-specific keys are read for the
    /// provider selected after `LLM_PROVIDER` is applied.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("JAMESPOT_URL") {
            self.backend.url = Some(url);
        }
        if let Some(email) = var("JAMESPOT_EMAIL") {
            self.backend.email = Some(email);
        }
        if let Some(password) = var("JAMESPOT_PASSWORD") {
            self.backend.password = Some(password);
        }
        if let Some(token) = var("JAMESPOT_TOKEN") {
            self.backend.token = Some(token);
        }

        if let Some(prompt) = var("SYSTEM_PROMPT") {
            self.agent.system_prompt = Some(prompt);
        }
        if let Some(debug) = var("DEBUG") {
            self.agent.debug = debug.eq_ignore_ascii_case("true");
        }
        if let Some(limit) = var("AGENT_MAX_ROUNDTRIPS") {
            self.agent.max_roundtrips = parse_number("AGENT_MAX_ROUNDTRIPS", &limit)?;
        }

        if let Some(provider) = var("LLM_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }
        if let Some(model) = var("LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(temperature) = var("LLM_TEMPERATURE") {
            self.llm.temperature = parse_number("LLM_TEMPERATURE", &temperature)?;
        }
        if let Some(max_tokens) = var("LLM_MAX_TOKENS") {
            self.llm.max_tokens = Some(parse_number("LLM_MAX_TOKENS", &max_tokens)?);
        }

        match self.llm.provider {
            LlmProviderKind::OpenAi => {
                if let Some(key) = var("OPENAI_API_KEY") {
                    self.llm.api_key = Some(key);
                }
                if let Some(url) = var("OPENAI_BASE_URL") {
                    self.llm.base_url = Some(url);
                }
            }
            LlmProviderKind::Safebrain => {
                if let Some(key) = var("SAFEBRAIN_API_KEY") {
                    self.llm.api_key = Some(key);
                }
                if let Some(url) = var("SAFEBRAIN_BASE_URL") {
                    self.llm.base_url = Some(url);
                }
                if let Some(instance) = var("SAFEBRAIN_INSTANCE") {
                    self.llm.instance = Some(instance);
                }
                if let Some(bot) = var("SAFEBRAIN_BOT_ID") {
                    self.llm.bot_id = Some(bot);
                }
                if let Some(group) = var("SAFEBRAIN_GROUP_ID") {
                    self.llm.group_id = Some(group);
                }
                if self.llm.model.is_none() {
                    self.llm.model = var("SAFEBRAIN_MODEL");
                }
            }
            LlmProviderKind::Anthropic => {
                if let Some(key) = var("ANTHROPIC_API_KEY") {
                    self.llm.api_key = Some(key);
                }
                if let Some(url) = var("ANTHROPIC_BASE_URL") {
                    self.llm.base_url = Some(url);
                }
            }
        }

        if let Some(key) = var("UNSPLASH_ACCESS_KEY") {
            self.image_search.unsplash_access_key = Some(key);
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".jamespot-agent")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_roundtrips == 0 {
            return Err(ConfigError::ValidationError(
                "max_roundtrips must be at least 1".into(),
            ));
        }

        if self.llm.max_tokens == Some(0) {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{var} is not a valid number: {value}")))
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required setting {0}")]
    Missing(&'static str),
}
