/// Generative text provider abstraction
///
/// The recommendation engine only needs "prompt in, raw text out". Providers
/// are stacked: [`CircuitBreaker`] wraps a concrete client such as
/// [`GeminiProvider`] and implements the same trait.
use std::time::Duration;

use crate::error::GenerativeError;

pub mod breaker;
pub mod gemini;

pub use breaker::CircuitBreaker;
pub use gemini::GeminiProvider;

/// Trait for generative text services
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Submits a prompt and returns the raw completion text
    ///
    /// Implementations must give up after `timeout` and report
    /// [`GenerativeError::Timeout`].
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, GenerativeError>;

    /// False when no credential is configured; callers skip the call entirely
    fn is_configured(&self) -> bool;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
