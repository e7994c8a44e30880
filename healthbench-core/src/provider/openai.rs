//! OpenAI chat-completions adapter, also used for Maritaca.

use super::http::{build_client, merge_extra_params, non_empty_text, post_json, trim_base_url};
use super::Provider;
use crate::config::ProviderSettings;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Provider for endpoints speaking the OpenAI chat-completions protocol.
pub struct OpenAiCompatibleProvider {
    name: String,
    client: reqwest::Client,
    settings: ProviderSettings,
    model: String,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for OpenAiCompatibleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleProvider")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiCompatibleProvider {
    /// Default OpenAI base URL.
    pub const OPENAI_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Default Maritaca base URL.
    pub const MARITACA_BASE_URL: &'static str = "https://chat.maritaca.ai/api";

    /// Create an OpenAI provider. Requires an API key.
    pub fn openai(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let model = settings.model.clone();
        Self::build("openai", Self::OPENAI_BASE_URL, model, settings)
    }

    /// Create a Maritaca provider. Requires an API key.
    ///
    /// Model aliases such as `sabia-3-large` are mapped to the served model id.
    pub fn maritaca(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let model = maritaca_model_id(&settings.model).to_string();
        Self::build("maritaca", Self::MARITACA_BASE_URL, model, settings)
    }

    fn build(
        kind: &str,
        default_base_url: &str,
        model: String,
        settings: ProviderSettings,
    ) -> Result<Self, ProviderError> {
        let api_key = settings.api_key.clone().ok_or_else(|| {
            ProviderError::Configuration(format!("{} API key is required", kind))
        })?;
        if model.trim().is_empty() {
            return Err(ProviderError::Configuration(format!(
                "{} model name is required",
                kind
            )));
        }

        let base_url = settings
            .base_url
            .as_deref()
            .map(trim_base_url)
            .unwrap_or_else(|| default_base_url.to_string());

        Ok(Self {
            name: format!("{}:{}", kind, model),
            client: build_client(&settings)?,
            endpoint: format!("{}/chat/completions", base_url),
            model,
            api_key,
            settings,
        })
    }

    /// The full chat-completions URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the chat-completions request body.
    pub fn request_body(&self, system_prompt: &str, user_prompt: &str) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        });
        if let Some(map) = body.as_object_mut() {
            merge_extra_params(map, &self.settings.extra_params);
        }
        body
    }

    /// Extract the first choice's message content.
    pub fn extract_text(response: &Value) -> Result<String, ProviderError> {
        let content = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .ok_or_else(|| {
                ProviderError::InvalidResponse("missing choices[0].message.content".to_string())
            })?;

        match content {
            Value::String(text) => non_empty_text(text),
            Value::Null => Err(ProviderError::NoContent),
            other => Err(ProviderError::InvalidResponse(format!(
                "unexpected content type: {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        let body = self.request_body(system_prompt, user_prompt);
        let response = post_json(
            &self.client,
            &self.settings,
            &self.endpoint,
            Some(&self.api_key),
            &body,
        )
        .await?;
        Self::extract_text(&response)
    }
}

/// Map Maritaca model aliases to served model ids.
fn maritaca_model_id(model: &str) -> &str {
    match model {
        "sabia-3-large" => "sabia-3",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn settings(model: &str) -> ProviderSettings {
        ProviderSettings::new(model).with_api_key(Some("sk-test".to_string()))
    }

    #[test]
    fn test_openai_default_endpoint() {
        let provider = OpenAiCompatibleProvider::openai(settings("gpt-4o")).unwrap();
        assert_eq!(provider.endpoint(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(provider.name(), "openai:gpt-4o");
    }

    #[test]
    fn test_maritaca_default_endpoint_and_alias() {
        let provider = OpenAiCompatibleProvider::maritaca(settings("sabia-3-large")).unwrap();
        assert_eq!(provider.endpoint(), "https://chat.maritaca.ai/api/chat/completions");
        assert_eq!(provider.name(), "maritaca:sabia-3");
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let provider = OpenAiCompatibleProvider::openai(
            settings("gpt-4o").with_base_url(Some("http://proxy.local/v1/".to_string())),
        )
        .unwrap();
        assert_eq!(provider.endpoint(), "http://proxy.local/v1/chat/completions");
    }

    #[test]
    fn test_missing_api_key() {
        let err = OpenAiCompatibleProvider::maritaca(ProviderSettings::new("sabia-3")).unwrap_err();
        assert!(err.to_string().contains("maritaca API key is required"));
    }

    #[test]
    fn test_request_body_shape() {
        let mut extra = Map::new();
        extra.insert("top_p".to_string(), json!(0.5));
        let provider = OpenAiCompatibleProvider::openai(
            settings("gpt-4o")
                .with_max_tokens(256)
                .with_extra_params(extra),
        )
        .unwrap();

        let body = provider.request_body("sys", "user");

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "user");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["top_p"], 0.5);
    }

    #[test]
    fn test_extract_text() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "  Resposta: Verdadeiro\n"}}]
        });
        assert_eq!(
            OpenAiCompatibleProvider::extract_text(&response).unwrap(),
            "Resposta: Verdadeiro"
        );
    }

    #[test]
    fn test_extract_text_errors() {
        let null_content = json!({"choices": [{"message": {"content": null}}]});
        assert!(matches!(
            OpenAiCompatibleProvider::extract_text(&null_content),
            Err(ProviderError::NoContent)
        ));

        let no_choices = json!({"choices": []});
        assert!(matches!(
            OpenAiCompatibleProvider::extract_text(&no_choices),
            Err(ProviderError::InvalidResponse(_))
        ));
    }
}
