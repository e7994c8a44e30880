//! Live provider tests.
//!
//! These tests require real credentials and are marked #[ignore].
//! Run with: cargo test -p healthbench-core -- --include-ignored

use healthbench_core::{
    build_provider, BedrockSettings, Provider, ProviderError, ProviderKind, ProviderSettings,
};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "Responda apenas com uma linha final: Resposta: Verdadeiro ou Resposta: Falso.";

fn settings_from_env(model: &str, key_var: &str) -> Option<ProviderSettings> {
    let api_key = std::env::var(key_var).ok()?;
    Some(
        ProviderSettings::new(model)
            .with_api_key(Some(api_key))
            .with_timeout(Duration::from_secs(60))
            .with_max_tokens(256)
            .with_max_retries(1)
            .with_retry_base_delay_ms(500),
    )
}

#[tokio::test]
#[ignore] // Requires OPENAI_API_KEY
async fn test_openai_answers_with_verdict_line() {
    let Some(settings) = settings_from_env("gpt-4o-mini", "OPENAI_API_KEY") else {
        eprintln!("Skipping test: OPENAI_API_KEY not set");
        return;
    };

    let provider =
        build_provider(ProviderKind::OpenAi, settings, BedrockSettings::default()).unwrap();
    let text = provider
        .invoke(SYSTEM_PROMPT, "O coração humano tem quatro câmaras.")
        .await
        .unwrap();

    assert!(
        text.contains("Verdadeiro") || text.contains("Falso"),
        "Expected a verdict token in: {}",
        text
    );
}

#[tokio::test]
#[ignore] // Requires MARITACA_API_KEY
async fn test_maritaca_answers_with_verdict_line() {
    let Some(settings) = settings_from_env("sabiazinho-3", "MARITACA_API_KEY") else {
        eprintln!("Skipping test: MARITACA_API_KEY not set");
        return;
    };

    let provider =
        build_provider(ProviderKind::Maritaca, settings, BedrockSettings::default()).unwrap();
    let text = provider
        .invoke(SYSTEM_PROMPT, "A penicilina é um antiviral.")
        .await
        .unwrap();

    assert!(!text.is_empty());
}

#[tokio::test]
async fn test_unreachable_ollama_fails_without_panicking() {
    let settings = ProviderSettings::new("llama3")
        .with_base_url(Some("http://127.0.0.1:1".to_string()))
        .with_timeout(Duration::from_secs(5))
        .with_max_retries(0);
    let provider =
        build_provider(ProviderKind::Ollama, settings, BedrockSettings::default()).unwrap();

    let err = provider.invoke("sys", "pergunta").await.unwrap_err();

    assert!(
        matches!(err, ProviderError::Http(_) | ProviderError::Timeout(_)),
        "unexpected error: {:?}",
        err
    );
}
