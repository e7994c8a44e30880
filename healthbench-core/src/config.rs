use serde_json::{Map, Value};
use std::time::Duration;

/// Default region for the Bedrock adapter.
pub const DEFAULT_BEDROCK_REGION: &str = "us-east-1";

/// Connection and generation settings shared by every provider adapter.
///
/// Credentials and base endpoints must already be resolved (no `${VAR}`
/// placeholders) by the time a provider is constructed from these settings.
#[derive(Clone)]
#[non_exhaustive]
pub struct ProviderSettings {
    /// Model identifier sent to the endpoint (aliases are mapped per adapter)
    pub model: String,

    /// Temperature for generation
    ///
    /// Default: 0.0
    pub temperature: f32,

    /// Maximum tokens per response
    ///
    /// Default: 12000
    pub max_tokens: u32,

    /// Timeout for a single HTTP request
    ///
    /// Default: 120 seconds
    pub timeout: Duration,

    /// API key or bearer token
    pub api_key: Option<String>,

    /// Endpoint override
    pub base_url: Option<String>,

    /// Maximum number of retries on transient failures
    ///
    /// Default: 2
    pub max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    ///
    /// Default: 1000ms (1 second)
    pub retry_base_delay_ms: u64,

    /// Extra request parameters merged into the request body
    pub extra_params: Map<String, Value>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("extra_params", &self.extra_params)
            .finish()
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.0,
            max_tokens: 12_000,
            timeout: Duration::from_secs(120),
            api_key: None,
            base_url: None,
            max_retries: 2,
            retry_base_delay_ms: 1000,
            extra_params: Map::new(),
        }
    }
}

impl ProviderSettings {
    /// Create settings for the given model with default generation parameters.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the temperature for generation.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum tokens per response.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the API key (ignored when `None` or empty).
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Set the endpoint override (ignored when `None` or empty).
    #[must_use]
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url.filter(|u| !u.trim().is_empty());
        self
    }

    /// Set the maximum number of retries on transient failures.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the base delay for exponential backoff (milliseconds).
    #[must_use]
    pub fn with_retry_base_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_base_delay_ms = delay_ms;
        self
    }

    /// Set extra request parameters.
    #[must_use]
    pub fn with_extra_params(mut self, extra_params: Map<String, Value>) -> Self {
        self.extra_params = extra_params;
        self
    }

    /// Timeout in milliseconds, for error reporting.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    /// Get the retry delay for a given attempt number (0-indexed)
    ///
    /// Uses exponential backoff: delay = base_delay * 2^attempt, capped at
    /// 60 seconds.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        const MAX_DELAY_MS: u64 = 60_000;

        let delay_ms = self
            .retry_base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(MAX_DELAY_MS);

        Duration::from_millis(delay_ms)
    }
}

/// Bedrock-specific settings.
#[derive(Clone)]
#[non_exhaustive]
pub struct BedrockSettings {
    /// AWS region hosting the runtime endpoint
    pub region: String,

    /// Bedrock API key sent as a bearer token
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for BedrockSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockSettings")
            .field("region", &self.region)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for BedrockSettings {
    fn default() -> Self {
        Self {
            region: DEFAULT_BEDROCK_REGION.to_string(),
            bearer_token: None,
        }
    }
}

impl BedrockSettings {
    /// Create Bedrock settings for a region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            bearer_token: None,
        }
    }

    /// Set the bearer token (ignored when `None` or empty).
    #[must_use]
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token.filter(|t| !t.trim().is_empty());
        self
    }
}
