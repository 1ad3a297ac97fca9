use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use stockdice_market_data::{Dataset, ForexPair, Record};

use super::freshness::is_fresh;
use crate::errors::Result;

/// Row filter for [`RecordStore::delete_where`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeletePredicate {
    /// Rows whose `last_updated_us` is strictly older than the given stamp.
    LastUpdatedBefore(i64),
}

/// Keyed, transactional store of dataset rows.
///
/// Rows are keyed by `symbol` for point-in-time datasets and by
/// `(symbol, fiscal_year, period)` for periodic ones. Implementations
/// serialize writers and make every `upsert` call atomic.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Latest `last_updated_us` for `symbol` in `dataset`, over all of its
    /// rows for periodic datasets.
    fn get_last_updated(&self, dataset: Dataset, symbol: &str) -> Result<Option<i64>>;

    fn is_fresh(
        &self,
        dataset: Dataset,
        symbol: &str,
        now_us: i64,
        max_age: Duration,
    ) -> Result<bool> {
        Ok(is_fresh(
            self.get_last_updated(dataset, symbol)?,
            now_us,
            max_age,
        ))
    }

    /// Symbols of the symbol directory, ordered.
    fn list_symbols(&self) -> Result<Vec<String>>;

    /// Symbols of every forex pair with USD as the quote currency, ordered.
    fn list_forex_symbols(&self) -> Result<Vec<String>>;

    /// Symbols whose company profile flags them as an ETF or a fund.
    fn fund_or_etf_symbols(&self) -> Result<HashSet<String>>;

    /// Write `records` in one transaction, stamping every row with
    /// `last_updated_us`. Existing stamps never move backwards.
    ///
    /// Returns the number of rows written.
    async fn upsert(
        &self,
        dataset: Dataset,
        records: Vec<Record>,
        last_updated_us: i64,
    ) -> Result<usize>;

    /// Insert or update forex pair metadata without touching prices or
    /// `last_updated_us`.
    async fn upsert_forex_pairs(&self, pairs: Vec<ForexPair>) -> Result<usize>;

    /// Delete the rows of `dataset` matching `predicate`. Returns the number
    /// of rows deleted.
    async fn delete_where(&self, dataset: Dataset, predicate: DeletePredicate) -> Result<usize>;
}
