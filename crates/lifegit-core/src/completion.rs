//! Completion service port.
//!
//! The task-decomposition pipeline talks to a remote large-language-model
//! API through this port. The core never owns a transport; an embedding
//! application supplies an implementation (HTTP client, local model, test
//! double).

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failure conditions a completion backend can surface.
///
/// The retry policy in the decomposition pipeline is driven entirely by
/// [`CompletionError::is_retryable`]: transient conditions are retried with
/// backoff, permanent ones go straight to the manual-plan fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The backend could not be reached at all.
    #[error("Completion service unreachable: {0}")]
    NetworkUnavailable(String),

    /// The request did not finish within the configured deadline.
    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend rejected the request due to rate limiting.
    #[error("Completion service rate limited")]
    RateLimited { retry_after: Option<Duration> },

    /// Credentials were missing or rejected.
    #[error("Completion service authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The request itself was malformed and will never succeed as-is.
    #[error("Completion request rejected: {0}")]
    BadRequest(String),

    /// The backend answered, but not with the structure the caller asked for.
    #[error("Completion response invalid: {0}")]
    InvalidResponse(String),

    /// The backend is up but the requested model is not serving.
    #[error("Completion model unavailable: {0}")]
    ModelUnavailable(String),
}

impl CompletionError {
    /// Whether a retry with the same prompt has a chance of succeeding.
    ///
    /// Authentication failures and malformed requests are permanent;
    /// everything else is a transient service condition.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkUnavailable(_)
            | Self::Timeout(_)
            | Self::RateLimited { .. }
            | Self::InvalidResponse(_)
            | Self::ModelUnavailable(_) => true,
            Self::AuthenticationFailed(_) | Self::BadRequest(_) => false,
        }
    }
}

/// An abstract completion capability backed by a remote LLM API.
///
/// Implementations are expected to have externally visible latency
/// (hundreds of milliseconds to seconds) and may fail with any
/// [`CompletionError`] condition. Callers treat `complete` as long-running
/// and wrap it in their own deadline.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends a prompt and returns the raw completion text.
    async fn complete(&self, prompt: &str) -> std::result::Result<String, CompletionError>;
}
