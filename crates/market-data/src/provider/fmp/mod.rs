//! Financial Modeling Prep (FMP) provider.
//!
//! Uses the `stable` API:
//! - `financial-statement-symbol-list` for the symbol directory
//! - `profile` for company profiles
//! - `income-statement` and `balance-sheet-statement` for fundamentals
//! - `forex-list` and `quote` for USD exchange rates
//!
//! FMP signals rate limiting either with HTTP 429 or, on some plans, with a
//! JSON body carrying retry-after fields. [`check_status`] normalizes both.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::traits::{HttpResponse, HttpTransport, MarketDataSource};
use super::transport::{ReqwestTransport, DEFAULT_TIMEOUT};
use crate::errors::MarketDataError;
use crate::models::lenient;
use crate::models::{
    BalanceSheet, CompanyProfile, Dataset, FetchOutcome, ForexPair, ForexQuote, IncomeStatement,
    Record, SymbolListing,
};

const PROVIDER_ID: &str = "FMP";

const BASE_URL: &str = "https://financialmodelingprep.com/stable";

const RATE_LIMIT_STATUS: u16 = 429;

/// Delay assumed for a bare HTTP 429.
const RATE_LIMIT_STATUS_DELAY: Duration = Duration::from_secs(1);

/// Body field carrying the retry delay in seconds.
pub const RATE_LIMIT_SECONDS: &str = "X-Rate-Limit-Retry-After-Seconds";

/// Body field carrying the retry delay in milliseconds.
pub const RATE_LIMIT_MILLISECONDS: &str = "X-Rate-Limit-Retry-After-Milliseconds";

const SYMBOL_LIST: &str = "financial-statement-symbol-list";
const PROFILE: &str = "profile";
const INCOME_STATEMENT: &str = "income-statement";
const BALANCE_SHEET: &str = "balance-sheet-statement";
const FOREX_LIST: &str = "forex-list";
const QUOTE: &str = "quote";

/// Quote row; only the price is of interest.
#[derive(Debug, Deserialize)]
struct QuoteRow {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    price: Option<f64>,
}

/// Classify a raw response, returning the JSON body on success.
///
/// - HTTP 429 → `RateLimited` with a one second delay
/// - a JSON object with retry-after seconds and/or milliseconds →
///   `RateLimited` with `seconds + milliseconds / 1000`
/// - any other non-2xx status → `ProviderError`
pub fn check_status(response: HttpResponse) -> Result<Value, MarketDataError> {
    if response.status == RATE_LIMIT_STATUS {
        return Err(MarketDataError::RateLimited {
            provider: PROVIDER_ID.to_string(),
            retry_after: RATE_LIMIT_STATUS_DELAY,
        });
    }

    if let Value::Object(ref object) = response.body {
        if object.contains_key(RATE_LIMIT_SECONDS) || object.contains_key(RATE_LIMIT_MILLISECONDS) {
            let seconds = lenient::number_field(object, RATE_LIMIT_SECONDS);
            let millis = lenient::number_field(object, RATE_LIMIT_MILLISECONDS);
            let delay = (seconds + millis / 1000.0).max(0.0);
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
                retry_after: Duration::try_from_secs_f64(delay).unwrap_or(RATE_LIMIT_STATUS_DELAY),
            });
        }
    }

    if !(200..300).contains(&response.status) {
        return Err(MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("HTTP {} - {}", response.status, error_message(&response.body)),
        });
    }

    Ok(response.body)
}

fn error_message(body: &Value) -> String {
    match body {
        Value::Object(object) => object
            .get("Error Message")
            .or_else(|| object.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Value::String(text) => text.chars().take(200).collect(),
        other => other.to_string(),
    }
}

/// Financial Modeling Prep provider.
pub struct FmpProvider {
    transport: Arc<dyn HttpTransport>,
    api_key: String,
    base_url: String,
}

impl FmpProvider {
    /// Create a provider with the default reqwest transport.
    pub fn new(api_key: String) -> Self {
        Self::with_transport(
            api_key,
            Arc::new(ReqwestTransport::new(PROVIDER_ID, DEFAULT_TIMEOUT)),
        )
    }

    /// Create a provider on top of a custom transport.
    pub fn with_transport(api_key: String, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    fn url(&self, endpoint: &str, symbol: Option<&str>) -> String {
        match symbol {
            Some(symbol) => format!(
                "{}/{}?symbol={}&apikey={}",
                self.base_url,
                endpoint,
                urlencoding::encode(symbol),
                urlencoding::encode(&self.api_key)
            ),
            None => format!(
                "{}/{}?apikey={}",
                self.base_url,
                endpoint,
                urlencoding::encode(&self.api_key)
            ),
        }
    }

    /// Issue one GET and decode the rows of the response.
    async fn get_rows<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        symbol: Option<&str>,
    ) -> Result<Vec<T>, MarketDataError> {
        // The URL carries the API key; log the endpoint only.
        debug!("FMP request: {} {}", endpoint, symbol.unwrap_or(""));
        let response = self.transport.get(&self.url(endpoint, symbol)).await?;
        let body = check_status(response)?;
        decode_rows(endpoint, body)
    }

    pub async fn company_profile(&self, symbol: &str) -> Result<FetchOutcome, MarketDataError> {
        let rows: Vec<CompanyProfile> = self.get_rows(PROFILE, Some(symbol)).await?;
        Ok(outcome(rows.into_iter().take(1).map(|mut profile| {
            profile.symbol = symbol.to_string();
            Record::CompanyProfile(profile)
        })))
    }

    pub async fn income_statements(&self, symbol: &str) -> Result<FetchOutcome, MarketDataError> {
        let rows: Vec<IncomeStatement> = self.get_rows(INCOME_STATEMENT, Some(symbol)).await?;
        Ok(outcome(rows.into_iter().map(|mut statement| {
            statement.symbol = symbol.to_string();
            Record::IncomeStatement(statement)
        })))
    }

    pub async fn balance_sheets(&self, symbol: &str) -> Result<FetchOutcome, MarketDataError> {
        let rows: Vec<BalanceSheet> = self.get_rows(BALANCE_SHEET, Some(symbol)).await?;
        Ok(outcome(rows.into_iter().map(|mut sheet| {
            sheet.symbol = symbol.to_string();
            Record::BalanceSheet(sheet)
        })))
    }

    pub async fn forex_quote(&self, symbol: &str) -> Result<FetchOutcome, MarketDataError> {
        let rows: Vec<QuoteRow> = self.get_rows(QUOTE, Some(symbol)).await?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(FetchOutcome::NoData);
        };
        if row.price.is_none() {
            warn!("No price for forex pair {}", symbol);
        }
        Ok(FetchOutcome::Data(vec![Record::ForexQuote(ForexQuote {
            symbol: symbol.to_string(),
            price: row.price,
        })]))
    }
}

fn outcome(records: impl Iterator<Item = Record>) -> FetchOutcome {
    let records: Vec<Record> = records.collect();
    if records.is_empty() {
        FetchOutcome::NoData
    } else {
        FetchOutcome::Data(records)
    }
}

/// Decode a successful body into rows.
///
/// FMP answers with an array; an empty array, `null` or `{}` means no data.
/// An object carrying `Error Message` is a provider-side error.
fn decode_rows<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<Vec<T>, MarketDataError> {
    let invalid = |message: String| MarketDataError::InvalidResponse {
        provider: PROVIDER_ID.to_string(),
        message: format!("{}: {}", endpoint, message),
    };

    match body {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value(body).map_err(|e| invalid(e.to_string())),
        Value::Object(ref object) if object.is_empty() => Ok(Vec::new()),
        Value::Object(ref object) if object.contains_key("Error Message") => {
            Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: error_message(&body),
            })
        }
        Value::Object(_) => serde_json::from_value(body)
            .map(|row| vec![row])
            .map_err(|e| invalid(e.to_string())),
        other => Err(invalid(format!("unexpected body {}", error_message(&other)))),
    }
}

#[async_trait]
impl MarketDataSource for FmpProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn list_symbols(&self) -> Result<Vec<SymbolListing>, MarketDataError> {
        let rows: Vec<SymbolListing> = self.get_rows(SYMBOL_LIST, None).await?;
        Ok(rows
            .into_iter()
            .filter(|listing| !listing.symbol.trim().is_empty())
            .collect())
    }

    async fn list_forex_pairs(&self) -> Result<Vec<ForexPair>, MarketDataError> {
        let rows: Vec<ForexPair> = self.get_rows(FOREX_LIST, None).await?;
        Ok(rows.into_iter().filter(ForexPair::quotes_usd).collect())
    }

    async fn fetch(
        &self,
        dataset: Dataset,
        symbol: &str,
    ) -> Result<FetchOutcome, MarketDataError> {
        match dataset {
            Dataset::CompanyProfile => self.company_profile(symbol).await,
            Dataset::IncomeStatement => self.income_statements(symbol).await,
            Dataset::BalanceSheet => self.balance_sheets(symbol).await,
            Dataset::Forex => self.forex_quote(symbol).await,
            Dataset::Symbols => Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "the symbol directory is not fetched per symbol".to_string(),
            }),
        }
    }
}
