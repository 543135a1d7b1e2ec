//! `EngineConfig`: one struct aggregating every recognized configuration
//! option, loadable from TOML with unknown keys rejected at load time.

use paperqa_agents::{ClarificationConfig, OrchestratorConfig, ResearchConfig, SynthesisConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_top_k() -> usize {
    5
}

fn default_min_score() -> f64 {
    0.5
}

fn default_max_results() -> usize {
    5
}

/// Configuration for the `pdf_retrieval` tool adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PdfRetrievalConfig {
    /// Maximum passages returned per call.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum similarity score a passage must meet to be returned.
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

impl Default for PdfRetrievalConfig {
    fn default() -> Self {
        Self { top_k: default_top_k(), min_score: default_min_score() }
    }
}

/// Configuration for the `web_search` tool adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebSearchConfig {
    /// Maximum results returned per call.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self { max_results: default_max_results() }
    }
}

/// Research's tool adapters, configured separately from `ResearchConfig`
/// itself since they parameterize the adapter constructors, not the
/// agent's own LLM-call settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchToolsConfig {
    /// `pdf_retrieval` settings.
    #[serde(default)]
    pub pdf_retrieval: PdfRetrievalConfig,
    /// `web_search` settings.
    #[serde(default)]
    pub web_search: WebSearchConfig,
}

fn default_ttl_seconds() -> u64 {
    86_400
}

/// Session Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionStoreConfig {
    /// Time-to-live for a session record, in seconds. Expired records
    /// load as empty rather than being actively purged.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self { ttl_seconds: default_ttl_seconds() }
    }
}

fn default_turn_deadline_seconds() -> u64 {
    120
}

fn default_llm_deadline_seconds() -> u64 {
    30
}

/// Turn Runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerSettingsConfig {
    /// Overall wall-clock deadline for one turn, in seconds.
    #[serde(default = "default_turn_deadline_seconds")]
    pub turn_deadline_seconds: u64,
    /// Per-LLM-call deadline, in seconds. Enforced at the provider's
    /// transport layer (see `AnthropicProvider::with_timeout`).
    #[serde(default = "default_llm_deadline_seconds")]
    pub llm_deadline_seconds: u64,
}

impl Default for RunnerSettingsConfig {
    fn default() -> Self {
        Self { turn_deadline_seconds: default_turn_deadline_seconds(), llm_deadline_seconds: default_llm_deadline_seconds() }
    }
}

/// Every recognized configuration option, aggregated into one struct.
/// Unknown keys anywhere in the document are rejected at load time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Orchestrator agent settings.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    /// Clarification agent settings.
    #[serde(default)]
    pub clarification: ClarificationConfig,
    /// Research agent settings.
    #[serde(default)]
    pub research: ResearchConfig,
    /// Research's tool adapters.
    #[serde(default)]
    pub research_tools: ResearchToolsConfig,
    /// Synthesis agent settings.
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Session store settings.
    #[serde(default)]
    pub session_store: SessionStoreConfig,
    /// Turn Runner settings.
    #[serde(default)]
    pub runner: RunnerSettingsConfig,
}

/// Errors loading an [`EngineConfig`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed, or named an unknown key.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file could not be read.
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The LLM API key was not set. Never read from the config file
    /// itself — only from the environment, so secrets never end up in
    /// a committed config document.
    #[error("{0} is not set")]
    MissingApiKey(&'static str),
}

/// Name of the environment variable carrying the Anthropic API key.
pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

impl EngineConfig {
    /// Parse an `EngineConfig` from a TOML document. Unknown keys are
    /// rejected rather than silently ignored.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// Load an `EngineConfig` from a TOML file at `path`.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Read the LLM API key from the environment. Never stored in or
    /// read from the config document.
    pub fn anthropic_api_key() -> Result<String, ConfigError> {
        std::env::var(ANTHROPIC_API_KEY_VAR).map_err(|_| ConfigError::MissingApiKey(ANTHROPIC_API_KEY_VAR))
    }
}
