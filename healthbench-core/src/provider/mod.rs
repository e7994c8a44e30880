//! Provider invocation port and concrete adapters.
//!
//! Every backend is reduced to one capability: given a system prompt and a
//! user prompt, return response text or fail. The evaluation engine only
//! ever sees `&dyn Provider`.

mod bedrock;
mod http;
mod ollama;
mod openai;

pub use bedrock::BedrockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatibleProvider;

use crate::config::{BedrockSettings, ProviderSettings};
use crate::error::ProviderError;
use async_trait::async_trait;
use std::str::FromStr;

/// A text-generation backend.
///
/// Implementations must be safe to invoke concurrently; the engine issues
/// up to `parallelism` calls at once against a shared reference.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use healthbench_core::{Provider, ProviderError};
///
/// struct AlwaysTrue;
///
/// #[async_trait]
/// impl Provider for AlwaysTrue {
///     fn name(&self) -> &str {
///         "always_true"
///     }
///
///     async fn invoke(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
///         Ok("Resposta: Verdadeiro".to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Send one system/user prompt pair and return the response text.
    async fn invoke(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, ProviderError>;
}

/// Supported provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// OpenAI chat completions
    OpenAi,
    /// Maritaca (Sabiá models), OpenAI-compatible wire protocol
    Maritaca,
    /// Self-hosted Ollama
    Ollama,
    /// AWS Bedrock Converse API
    Bedrock,
}

impl ProviderKind {
    /// All supported kinds, in display order.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Maritaca,
        ProviderKind::OpenAi,
        ProviderKind::Ollama,
        ProviderKind::Bedrock,
    ];

    /// Canonical type string as used in provider configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Maritaca => "maritaca",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Bedrock => "aws_bedrock",
        }
    }

    /// Whether this backend refuses to start without an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderKind::OpenAi | ProviderKind::Maritaca)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "maritaca" => Ok(ProviderKind::Maritaca),
            "ollama" => Ok(ProviderKind::Ollama),
            "aws_bedrock" | "bedrock" => Ok(ProviderKind::Bedrock),
            other => Err(ProviderError::Configuration(format!(
                "Unknown provider type: {}",
                other
            ))),
        }
    }
}

/// Construct a provider of the given kind.
///
/// Fails with [`ProviderError::Configuration`] when a required credential
/// is missing or the HTTP client cannot be built.
pub fn build_provider(
    kind: ProviderKind,
    settings: ProviderSettings,
    bedrock: BedrockSettings,
) -> Result<Box<dyn Provider>, ProviderError> {
    let provider: Box<dyn Provider> = match kind {
        ProviderKind::OpenAi => Box::new(OpenAiCompatibleProvider::openai(settings)?),
        ProviderKind::Maritaca => Box::new(OpenAiCompatibleProvider::maritaca(settings)?),
        ProviderKind::Ollama => Box::new(OllamaProvider::new(settings)?),
        ProviderKind::Bedrock => Box::new(BedrockProvider::new(settings, bedrock)?),
    };
    log::debug!("Built provider {}", provider.name());
    Ok(provider)
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn invoke(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        (**self).invoke(system_prompt, user_prompt).await
    }
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for std::sync::Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn invoke(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        (**self).invoke(system_prompt, user_prompt).await
    }
}
