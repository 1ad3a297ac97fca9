//! Market data source trait definitions.
//!
//! This module defines the `MarketDataSource` trait the refresh engine
//! drives, and the `HttpTransport` seam every provider issues requests
//! through.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Dataset, FetchOutcome, ForexPair, SymbolListing};

/// A source of per-symbol financial records.
///
/// Implementations perform exactly one request per call and classify the
/// result; pacing and retries are applied by the caller through
/// [`RetryPolicy`](crate::limiter::RetryPolicy).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use stockdice_market_data::{Dataset, FetchOutcome, MarketDataError, MarketDataSource};
///
/// struct StaticSource;
///
/// #[async_trait]
/// impl MarketDataSource for StaticSource {
///     fn id(&self) -> &'static str {
///         "STATIC"
///     }
///
///     async fn fetch(&self, dataset: Dataset, symbol: &str) -> Result<FetchOutcome, MarketDataError> {
///         Ok(FetchOutcome::NoData)
///     }
///
///     // ... list_symbols, list_forex_pairs
/// }
/// ```
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Constant identifier such as "FMP", used in logs and errors.
    fn id(&self) -> &'static str;

    /// Fetch the full symbol directory.
    async fn list_symbols(&self) -> Result<Vec<SymbolListing>, MarketDataError>;

    /// Fetch the currency pairs quoted in USD.
    async fn list_forex_pairs(&self) -> Result<Vec<ForexPair>, MarketDataError>;

    /// Fetch the records of `dataset` for one symbol.
    ///
    /// For [`Dataset::Forex`] the symbol is the pair symbol (e.g. `EURUSD`).
    async fn fetch(&self, dataset: Dataset, symbol: &str)
        -> Result<FetchOutcome, MarketDataError>;
}

/// Status code and decoded body of one HTTP GET.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Decoded JSON, or `Value::String` holding the raw text when the body
    /// was not JSON.
    pub body: serde_json::Value,
}

/// Minimal GET transport. TLS, pooling and timeouts are its concern.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, MarketDataError>;
}
