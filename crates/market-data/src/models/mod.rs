//! Market data models
//!
//! - `dataset` - The fact tables kept fresh (Dataset)
//! - `profile` - Company profile (CompanyProfile)
//! - `statements` - Periodic fundamentals (IncomeStatement, BalanceSheet)
//! - `forex` - Currency pairs and quotes (ForexPair, ForexQuote)
//! - `listing` - Symbol directory entries (SymbolListing)
//! - `record` - Normalized rows and fetch outcomes (Record, RecordKey, FetchOutcome)

mod dataset;
mod forex;
pub(crate) mod lenient;
mod listing;
mod profile;
mod record;
mod statements;

pub use dataset::Dataset;
pub use forex::{ForexPair, ForexQuote};
pub use listing::SymbolListing;
pub use profile::CompanyProfile;
pub use record::{FetchOutcome, Record, RecordKey, PLACEHOLDER_FISCAL_YEAR, PLACEHOLDER_PERIOD};
pub use statements::{BalanceSheet, IncomeStatement};
