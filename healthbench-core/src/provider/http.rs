//! JSON-over-HTTP plumbing shared by the adapters.

use crate::config::ProviderSettings;
use crate::error::ProviderError;
use serde_json::{Map, Value};

/// Build a reqwest client honoring the configured timeout.
pub(crate) fn build_client(settings: &ProviderSettings) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(settings.timeout)
        .build()
        .map_err(|e| ProviderError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Strip a trailing slash so paths can be appended with `format!`.
pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Copy extra parameters into `target` without clobbering keys the adapter set.
pub(crate) fn merge_extra_params(target: &mut Map<String, Value>, extra: &Map<String, Value>) {
    for (key, value) in extra {
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Trim response text, rejecting empty answers.
pub(crate) fn non_empty_text(text: &str) -> Result<String, ProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::NoContent);
    }
    Ok(trimmed.to_string())
}

/// POST a JSON body and decode a JSON response, retrying transient failures.
///
/// Retries use exponential backoff from [`ProviderSettings::retry_delay`]
/// and stop after `settings.max_retries` additional attempts.
pub(crate) async fn post_json(
    client: &reqwest::Client,
    settings: &ProviderSettings,
    url: &str,
    bearer_token: Option<&str>,
    body: &Value,
) -> Result<Value, ProviderError> {
    let mut last_error = None;

    for attempt in 0..=settings.max_retries {
        match post_json_once(client, settings, url, bearer_token, body).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < settings.max_retries => {
                log::warn!(
                    "Provider request to {} failed (attempt {}/{}): {}, retrying...",
                    url,
                    attempt + 1,
                    settings.max_retries + 1,
                    e
                );
                last_error = Some(e);
                tokio::time::sleep(settings.retry_delay(attempt)).await;
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error
        .unwrap_or_else(|| ProviderError::Other("Retry loop exited unexpectedly".to_string())))
}

async fn post_json_once(
    client: &reqwest::Client,
    settings: &ProviderSettings,
    url: &str,
    bearer_token: Option<&str>,
    body: &Value,
) -> Result<Value, ProviderError> {
    let mut request = client.post(url).json(body);
    if let Some(token) = bearer_token {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from_transport(e, settings.timeout_ms()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(status.as_u16(), body));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}
