//! Stockdice Market Data Crate
//!
//! Fetching of per-symbol financial records from the data provider.
//!
//! # Overview
//!
//! The market data crate supports:
//! - The datasets kept fresh by the refresh engine (symbol directory,
//!   company profiles, income statements, balance sheets, forex)
//! - The Financial Modeling Prep provider behind a small HTTP seam
//! - One global rate gate shared by every concurrent request
//! - A retry policy driven by error classification
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  Refresh engine  | --> |   RetryPolicy    |  (retry on rate limits/timeouts)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |     RateGate     |  (global request spacing)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | MarketDataSource |  (FMP)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   FetchOutcome   |  (records or "no data")
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Dataset`] - A fact table kept fresh by the refresh engine
//! - [`Record`] - A normalized row ready to be upserted
//! - [`FetchOutcome`] - Terminal result of one fetch
//! - [`MarketDataError`] - Provider errors with their [`RetryClass`]

pub mod errors;
pub mod limiter;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};

pub use limiter::{RateGate, RatePermit, RetryPolicy, DEFAULT_MIN_BACKOFF, DEFAULT_REQUESTS_PER_MINUTE};

pub use models::{
    BalanceSheet, CompanyProfile, Dataset, FetchOutcome, ForexPair, ForexQuote, IncomeStatement,
    Record, RecordKey, SymbolListing, PLACEHOLDER_FISCAL_YEAR, PLACEHOLDER_PERIOD,
};

pub use provider::{
    check_status, FmpProvider, HttpResponse, HttpTransport, MarketDataSource, ReqwestTransport,
};
