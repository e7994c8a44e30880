//! Ollama `/api/generate` adapter.

use super::http::{build_client, merge_extra_params, non_empty_text, post_json, trim_base_url};
use super::Provider;
use crate::config::ProviderSettings;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Provider for a self-hosted Ollama server.
///
/// Ollama's generate endpoint takes a single prompt, so the system and
/// user prompts are joined with a blank line.
#[derive(Debug)]
pub struct OllamaProvider {
    name: String,
    client: reqwest::Client,
    settings: ProviderSettings,
    endpoint: String,
}

impl OllamaProvider {
    /// Default Ollama base URL.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:11434";

    /// Create an Ollama provider.
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        if settings.model.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "ollama model name is required".to_string(),
            ));
        }

        let base_url = settings
            .base_url
            .as_deref()
            .map(trim_base_url)
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());

        Ok(Self {
            name: format!("ollama:{}", settings.model),
            client: build_client(&settings)?,
            endpoint: format!("{}/api/generate", base_url),
            settings,
        })
    }

    /// The full generate URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the generate request body.
    pub fn request_body(&self, system_prompt: &str, user_prompt: &str) -> Value {
        let mut options = json!({
            "temperature": self.settings.temperature,
            "num_predict": self.settings.max_tokens,
        });
        if let Some(map) = options.as_object_mut() {
            merge_extra_params(map, &self.settings.extra_params);
        }

        json!({
            "model": self.settings.model,
            "prompt": format!("{}\n\n{}", system_prompt, user_prompt),
            "stream": false,
            "options": options,
        })
    }

    /// Extract the generated text.
    pub fn extract_text(response: &Value) -> Result<String, ProviderError> {
        let text = response
            .get("response")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::InvalidResponse("missing response field".to_string()))?;
        non_empty_text(text)
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        let body = self.request_body(system_prompt, user_prompt);
        let response = post_json(&self.client, &self.settings, &self.endpoint, None, &body).await?;
        Self::extract_text(&response)
    }
}
