//! Scripted provider for offline runs and tests.
//!
//! [`MockProvider`] answers from a closure instead of a network endpoint,
//! which makes evaluation runs deterministic and free. It also records how
//! many calls it received and the peak number of calls in flight at once,
//! so tests can check the engine's concurrency bound.
//!
//! # Example
//!
//! ```
//! use healthbench_core::{MockProvider, Provider};
//!
//! # async fn example() -> Result<(), healthbench_core::ProviderError> {
//! let mock = MockProvider::constant("Resposta: Verdadeiro");
//! let text = mock.invoke("system", "A aspirina é um AINE?").await?;
//! assert_eq!(text, "Resposta: Verdadeiro");
//! assert_eq!(mock.call_count(), 1);
//! # Ok(())
//! # }
//! ```

use crate::error::ProviderError;
use crate::provider::Provider;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Responder = dyn Fn(&str) -> Result<String, ProviderError> + Send + Sync;

/// Provider that answers each user prompt with a scripted response.
pub struct MockProvider {
    name: String,
    responder: Box<Responder>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("name", &self.name)
            .field("delay", &self.delay)
            .field("calls", &self.call_count())
            .finish()
    }
}

impl MockProvider {
    /// Create a mock from a closure mapping the user prompt to a response.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Self {
            name: "mock".to_string(),
            responder: Box::new(responder),
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Mock that always returns the same text.
    pub fn constant(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Mock whose every call fails with [`ProviderError::Other`].
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_| Err(ProviderError::Other(message.clone())))
    }

    /// Set the name reported by [`Provider::name`].
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sleep for `delay` inside every call, to hold calls in flight.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were in flight simultaneously.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = (self.responder)(user_prompt);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_constant_mock() {
        let mock = MockProvider::constant("Resposta: Falso").with_name("stub");
        assert_eq!(mock.name(), "stub");
        assert_eq!(mock.invoke("s", "q").await.unwrap(), "Resposta: Falso");
        assert_eq!(mock.invoke("s", "q").await.unwrap(), "Resposta: Falso");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockProvider::failing("boom");
        let err = mock.invoke("s", "q").await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_responder_sees_user_prompt() {
        let mock = MockProvider::new(|prompt| Ok(format!("eco: {}", prompt)));
        assert_eq!(mock.invoke("s", "oi").await.unwrap(), "eco: oi");
    }

    #[tokio::test]
    async fn test_peak_concurrency_tracks_overlap() {
        let mock = MockProvider::constant("x").with_delay(Duration::from_millis(20));
        let (a, b, c) = tokio::join!(
            mock.invoke("s", "q1"),
            mock.invoke("s", "q2"),
            mock.invoke("s", "q3")
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(mock.peak_concurrency(), 3);
        assert_eq!(mock.call_count(), 3);
    }
}
