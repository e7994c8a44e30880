//! # HealthBench Core
//!
//! Provider invocation port for the HealthBench-BR true/false benchmark.
//!
//! Every LLM backend is reduced to a single capability, [`Provider::invoke`]:
//! send a system prompt and a user prompt, get response text back or a
//! [`ProviderError`]. The evaluation engine in `healthbench-eval` depends
//! only on that trait.
//!
//! ## Adapters
//!
//! - [`OpenAiCompatibleProvider`]: OpenAI chat completions, and Maritaca
//!   (Sabiá models) over the same wire protocol
//! - [`OllamaProvider`]: self-hosted Ollama `/api/generate`
//! - [`BedrockProvider`]: AWS Bedrock Converse API with bearer-token auth
//! - [`MockProvider`]: scripted responses for offline runs and tests
//!
//! ## Example
//!
//! ```no_run
//! use healthbench_core::{build_provider, BedrockSettings, ProviderKind, ProviderSettings};
//!
//! # async fn example() -> Result<(), healthbench_core::ProviderError> {
//! let settings = ProviderSettings::new("sabia-3")
//!     .with_api_key(std::env::var("MARITACA_API_KEY").ok());
//! let provider = build_provider(ProviderKind::Maritaca, settings, BedrockSettings::default())?;
//!
//! let answer = provider
//!     .invoke("Responda com Verdadeiro ou Falso.", "A insulina é produzida no pâncreas?")
//!     .await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod mock_provider;
pub mod provider;

// Re-export public API
pub use config::{BedrockSettings, ProviderSettings, DEFAULT_BEDROCK_REGION};
pub use error::ProviderError;
pub use mock_provider::MockProvider;
pub use provider::{
    build_provider, BedrockProvider, OllamaProvider, OpenAiCompatibleProvider, Provider,
    ProviderKind,
};
