//! AWS Bedrock Converse API adapter (bearer-token authentication).

use super::http::{build_client, merge_extra_params, non_empty_text, post_json, trim_base_url};
use super::Provider;
use crate::config::{BedrockSettings, ProviderSettings};
use crate::error::ProviderError;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Provider for models hosted on AWS Bedrock.
///
/// Authenticates with a Bedrock API key sent as a bearer token; SigV4
/// signing is not supported.
pub struct BedrockProvider {
    name: String,
    client: reqwest::Client,
    settings: ProviderSettings,
    endpoint: String,
    bearer_token: String,
}

impl std::fmt::Debug for BedrockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockProvider")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("bearer_token", &"[REDACTED]")
            .finish()
    }
}

impl BedrockProvider {
    /// Create a Bedrock provider. Requires a bearer token.
    pub fn new(
        settings: ProviderSettings,
        bedrock: BedrockSettings,
    ) -> Result<Self, ProviderError> {
        let bearer_token = bedrock.bearer_token.clone().ok_or_else(|| {
            ProviderError::Configuration("AWS bearer token is required for Bedrock".to_string())
        })?;
        if settings.model.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "bedrock model name is required".to_string(),
            ));
        }

        let model_id = bedrock_model_id(&settings.model);
        let base_url = settings
            .base_url
            .as_deref()
            .map(trim_base_url)
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", bedrock.region));

        Ok(Self {
            name: format!("aws_bedrock:{}", model_id),
            client: build_client(&settings)?,
            endpoint: format!("{}/model/{}/converse", base_url, model_id),
            bearer_token,
            settings,
        })
    }

    /// The full Converse URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the Converse request body.
    pub fn request_body(&self, system_prompt: &str, user_prompt: &str) -> Value {
        let mut inference = json!({
            "maxTokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
        });
        if let Some(map) = inference.as_object_mut() {
            merge_extra_params(map, &self.settings.extra_params);
        }

        json!({
            "system": [{"text": system_prompt}],
            "messages": [{"role": "user", "content": [{"text": user_prompt}]}],
            "inferenceConfig": inference,
        })
    }

    /// Concatenate the text blocks of the output message.
    pub fn extract_text(response: &Value) -> Result<String, ProviderError> {
        let blocks = response
            .pointer("/output/message/content")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ProviderError::InvalidResponse("missing output.message.content".to_string())
            })?;

        let text: String = blocks
            .iter()
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("");
        non_empty_text(&text)
    }
}

#[async_trait]
impl Provider for BedrockProvider {
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
            Some(&self.bearer_token),
            &body,
        )
        .await?;
        Self::extract_text(&response)
    }
}

/// Map short model names to Bedrock model ids.
fn bedrock_model_id(model: &str) -> &str {
    match model {
        "claude-3-opus" => "anthropic.claude-3-opus-20240229-v1:0",
        "claude-3-sonnet" => "anthropic.claude-3-sonnet-20240229-v1:0",
        "claude-3-haiku" => "anthropic.claude-3-haiku-20240307-v1:0",
        "claude-2" => "anthropic.claude-v2:1",
        "claude-instant" => "anthropic.claude-instant-v1",
        "llama2-70b" => "meta.llama2-70b-chat-v1",
        "llama2-13b" => "meta.llama2-13b-chat-v1",
        "mistral-large" => "mistral.mistral-large-2402-v1:0",
        "mixtral-8x7b" => "mistral.mixtral-8x7b-instruct-v0:1",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bedrock() -> BedrockSettings {
        BedrockSettings::new("sa-east-1").with_bearer_token(Some("tok".to_string()))
    }

    #[test]
    fn test_endpoint_uses_region_and_mapped_model() {
        let provider =
            BedrockProvider::new(ProviderSettings::new("claude-3-haiku"), bedrock()).unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://bedrock-runtime.sa-east-1.amazonaws.com/model/anthropic.claude-3-haiku-20240307-v1:0/converse"
        );
    }

    #[test]
    fn test_unmapped_model_passes_through() {
        let provider = BedrockProvider::new(
            ProviderSettings::new("amazon.nova-pro-v1:0")
                .with_base_url(Some("http://localhost:9000/".to_string())),
            bedrock(),
        )
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9000/model/amazon.nova-pro-v1:0/converse"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let provider = BedrockProvider::new(
            ProviderSettings::new("claude-3-haiku").with_max_tokens(100),
            bedrock(),
        )
        .unwrap();
        let body = provider.request_body("sys", "Pergunta?");

        assert_eq!(body["system"][0]["text"], "sys");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["text"], "Pergunta?");
        assert_eq!(body["inferenceConfig"]["maxTokens"], 100);
    }

    #[test]
    fn test_extract_text_joins_blocks() {
        let response = json!({
            "output": {"message": {"role": "assistant", "content": [
                {"text": "Analisando.\n"},
                {"text": "Resposta: Verdadeiro"}
            ]}},
            "stopReason": "end_turn"
        });
        assert_eq!(
            BedrockProvider::extract_text(&response).unwrap(),
            "Analisando.\nResposta: Verdadeiro"
        );
    }

    #[test]
    fn test_missing_token() {
        let err = BedrockProvider::new(
            ProviderSettings::new("claude-3-haiku"),
            BedrockSettings::default(),
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }
}
