//! Market data source abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataSource` trait the refresh engine drives
//! - The `HttpTransport` seam and its reqwest implementation
//! - The Financial Modeling Prep provider
//!
//! Sources perform one request per call. Pacing against the provider's
//! global limit and retrying are layered on top by the caller, so every
//! dataset shares the same behavior.

pub mod fmp;
mod traits;
mod transport;

pub use fmp::{check_status, FmpProvider};
pub use traits::{HttpResponse, HttpTransport, MarketDataSource};
pub use transport::{ReqwestTransport, DEFAULT_TIMEOUT};
