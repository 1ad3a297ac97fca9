//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all provider operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to a market data provider.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method, which determines how the retry
/// policy handles it.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider rate limited the request, either with HTTP 429 or with
    /// retry-after fields in the response body.
    #[error("Rate limited: {provider} (retry after {retry_after:?})")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
        /// How long the provider asked us to wait
        retry_after: Duration,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider answered with an error status or error payload.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        /// The provider that returned the payload
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The request could not be sent (DNS, TLS, connection refused).
    #[error("Network error: {0}")]
    Network(String),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::Backoff`]: rate limited, retry after the reported delay
    /// - [`RetryClass::Immediate`]: transient, retry at the next rate gate slot
    /// - [`RetryClass::Never`]: propagate to the caller
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use stockdice_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited {
    ///     provider: "FMP".to_string(),
    ///     retry_after: Duration::from_secs(2),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::Backoff(Duration::from_secs(2)));
    ///
    /// let error = MarketDataError::Network("connection refused".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { retry_after, .. } => RetryClass::Backoff(*retry_after),
            Self::Timeout { .. } => RetryClass::Immediate,
            Self::ProviderError { .. } | Self::InvalidResponse { .. } | Self::Network(_) => {
                RetryClass::Never
            }
        }
    }
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        MarketDataError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = MarketDataError::RateLimited {
            provider: "FMP".to_string(),
            retry_after: Duration::from_millis(1500),
        };
        assert_eq!(
            error.retry_class(),
            RetryClass::Backoff(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_timeout_retries_immediately() {
        let error = MarketDataError::Timeout {
            provider: "FMP".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Immediate);
    }

    #[test]
    fn test_provider_error_never_retries() {
        let error = MarketDataError::ProviderError {
            provider: "FMP".to_string(),
            message: "Invalid API KEY".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_invalid_response_never_retries() {
        let error = MarketDataError::InvalidResponse {
            provider: "FMP".to_string(),
            message: "expected array".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::Timeout {
            provider: "FMP".to_string(),
        };
        assert_eq!(format!("{}", error), "Timeout: FMP");

        let error = MarketDataError::ProviderError {
            provider: "FMP".to_string(),
            message: "HTTP 500".to_string(),
        };
        assert_eq!(format!("{}", error), "Provider error: FMP - HTTP 500");
    }
}
