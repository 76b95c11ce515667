use thiserror::Error;

/// Errors that can occur when interacting with a contribution provider.
///
/// The taxonomy separates *hard* failures (a bad username is `NotFound`
/// and will never succeed on retry) from *soft* failures (`RateLimited`,
/// `Upstream`, `Network`) that a caller may retry after a delay.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The username does not exist on the provider. Non-retryable.
    #[error("No such user on provider: {username}")]
    NotFound { username: String },

    /// Provider rate limit exhausted; retry after the disclosed delay.
    #[error("Rate limited. Retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    /// Transient provider-side failure (5xx, malformed payload).
    #[error("Upstream error: {message}")]
    Upstream { message: String },

    /// Network or connection error.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Unexpected/internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ProviderError {
    /// Create a not found error.
    #[inline]
    pub fn not_found(username: impl Into<String>) -> Self {
        Self::NotFound {
            username: username.into(),
        }
    }

    /// Create an upstream error.
    #[inline]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a network error.
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is a rate limit error.
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Check if a retry could plausibly succeed.
    ///
    /// `NotFound` and `Internal` never become true on retry; everything
    /// else is a transient condition.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Upstream { .. } | Self::Network { .. }
        )
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which matters for errors
/// that carry backtraces or multi-line upstream bodies.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
