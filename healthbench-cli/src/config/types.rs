//! Serde types for the providers configuration file.
//!
//! These mirror the core settings structs but use file-friendly types
//! (e.g. `u64` seconds instead of `Duration`) and keep per-provider values
//! optional so they can fall back to `default_settings`.

use healthbench_core::{
    BedrockSettings, ProviderKind, ProviderSettings, DEFAULT_BEDROCK_REGION,
};
use healthbench_eval::DEFAULT_PARALLELISM;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::time::Duration;

/// Run-wide defaults (`default_settings`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct DefaultSettings {
    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens per response
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout: u64,

    /// In-flight provider calls per chunk
    pub parallelism: usize,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 12000,
            timeout: 120,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

/// One entry of the `providers` list.
///
/// Keys not listed here are kept in `extra_params` and forwarded to the
/// backend request.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ProviderEntry {
    /// Display name, unique within the file
    pub name: String,

    /// Provider type (`openai`, `maritaca`, `ollama`, `aws_bedrock`)
    #[serde(rename = "type")]
    pub kind: String,

    /// Model identifier
    pub model: String,

    /// API key (OpenAI, Maritaca)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,

    /// AWS region (Bedrock)
    #[serde(default)]
    pub region: Option<String>,

    /// Bedrock API key used as a bearer token
    #[serde(default)]
    pub aws_bearer_token: Option<String>,

    /// Overrides `default_settings.temperature`
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Overrides `default_settings.max_tokens`
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Overrides `default_settings.timeout` (seconds)
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Retries per call after the first attempt
    #[serde(default)]
    pub max_retries: Option<u32>,

    /// Unrecognized keys
    #[serde(flatten)]
    pub extra_params: Map<String, Value>,
}

impl std::fmt::Debug for ProviderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("region", &self.region)
            .field(
                "aws_bearer_token",
                &self.aws_bearer_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("extra_params", &self.extra_params)
            .finish()
    }
}

impl ProviderEntry {
    /// Create an entry with only the required fields.
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            model: model.into(),
            api_key: None,
            base_url: None,
            region: None,
            aws_bearer_token: None,
            temperature: None,
            max_tokens: None,
            timeout: None,
            max_retries: None,
            extra_params: Map::new(),
        }
    }

    /// Parsed provider kind.
    pub fn provider_kind(&self) -> Result<ProviderKind, healthbench_core::ProviderError> {
        ProviderKind::from_str(&self.kind)
    }

    /// Effective region, defaulting to `us-east-1`.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_BEDROCK_REGION)
    }

    /// Core provider settings with `defaults` filled in.
    pub fn provider_settings(&self, defaults: &DefaultSettings) -> ProviderSettings {
        let settings = ProviderSettings::new(self.model.clone());
        let max_retries = self.max_retries.unwrap_or(settings.max_retries);
        settings
            .with_temperature(self.temperature.unwrap_or(defaults.temperature))
            .with_max_tokens(self.max_tokens.unwrap_or(defaults.max_tokens))
            .with_timeout(Duration::from_secs(self.timeout.unwrap_or(defaults.timeout)))
            .with_api_key(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_max_retries(max_retries)
            .with_extra_params(self.extra_params.clone())
    }

    /// Bedrock settings for this entry.
    pub fn bedrock_settings(&self) -> BedrockSettings {
        BedrockSettings::new(self.region()).with_bearer_token(self.aws_bearer_token.clone())
    }
}

/// Root structure of the providers file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ProvidersFile {
    /// Run-wide defaults
    #[serde(default)]
    pub default_settings: DefaultSettings,

    /// Configured providers, in file order
    pub providers: Vec<ProviderEntry>,
}
