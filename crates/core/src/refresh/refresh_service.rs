use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use stockdice_market_data::{
    Dataset, FetchOutcome, MarketDataSource, RateGate, Record, RetryPolicy,
};

use super::fund_classifier::FundClassifier;
use super::refresh_model::{RefreshReport, RefreshScope, RefreshSummary, SymbolOutcome};
use crate::errors::Result;
use crate::fx::UsdConverter;
use crate::records::{DeletePredicate, RecordStore};
use crate::utils::Clock;

/// Keeps every dataset of the record store fresh within a max age.
///
/// All requests, whatever the dataset, go through one shared [`RateGate`]
/// and are retried by one [`RetryPolicy`]. Symbols within a pass are
/// refreshed concurrently; a failing symbol is logged and does not affect
/// its siblings.
#[derive(Clone)]
pub struct RefreshEngine {
    source: Arc<dyn MarketDataSource>,
    store: Arc<dyn RecordStore>,
    gate: Arc<RateGate>,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    funds: FundClassifier,
    usd_converter: Option<UsdConverter>,
}

impl RefreshEngine {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        store: Arc<dyn RecordStore>,
        gate: Arc<RateGate>,
        retry: RetryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let funds = FundClassifier::new(store.clone());
        Self {
            source,
            store,
            gate,
            retry,
            clock,
            funds,
            usd_converter: None,
        }
    }

    /// Invalidate `converter` whenever forex prices were refreshed.
    pub fn with_usd_converter(mut self, converter: UsdConverter) -> Self {
        self.usd_converter = Some(converter);
        self
    }

    pub fn fund_classifier(&self) -> &FundClassifier {
        &self.funds
    }

    /// Refresh one dataset over its full candidate set.
    ///
    /// Candidates are the symbol directory for company profiles and
    /// fundamentals, and the stored USD pairs for forex. The symbol
    /// directory itself is replaced wholesale.
    pub async fn refresh(&self, dataset: Dataset, max_age: Duration) -> Result<RefreshSummary> {
        match dataset {
            Dataset::Symbols => self.refresh_symbol_directory().await,
            Dataset::Forex => self.refresh_forex(max_age).await,
            Dataset::CompanyProfile | Dataset::IncomeStatement | Dataset::BalanceSheet => {
                let symbols = self.store.list_symbols()?;
                self.refresh_symbols(dataset, &symbols, max_age).await
            }
        }
    }

    /// Refresh the datasets of `scope`, isolating failures per dataset.
    pub async fn refresh_scope(&self, scope: RefreshScope, max_age: Duration) -> RefreshReport {
        match scope {
            RefreshScope::MarketData => self.refresh_market_data(max_age).await,
            RefreshScope::Everything => self.refresh_everything(max_age).await,
            RefreshScope::Dataset(dataset) => {
                let mut report = RefreshReport::default();
                report.push(dataset, self.refresh(dataset, max_age).await);
                report
            }
        }
    }

    /// Symbol directory, then forex and company profiles concurrently.
    pub async fn refresh_market_data(&self, max_age: Duration) -> RefreshReport {
        let mut report = RefreshReport::default();
        report.push(Dataset::Symbols, self.refresh_symbol_directory().await);

        let (forex, profile) = futures::join!(
            self.refresh(Dataset::Forex, max_age),
            self.refresh(Dataset::CompanyProfile, max_age),
        );
        report.push(Dataset::Forex, forex);
        report.push(Dataset::CompanyProfile, profile);
        report
    }

    /// Symbol directory, then every other dataset concurrently.
    pub async fn refresh_everything(&self, max_age: Duration) -> RefreshReport {
        let mut report = RefreshReport::default();
        report.push(Dataset::Symbols, self.refresh_symbol_directory().await);

        let (forex, profile, income, balance) = futures::join!(
            self.refresh(Dataset::Forex, max_age),
            self.refresh(Dataset::CompanyProfile, max_age),
            self.refresh(Dataset::IncomeStatement, max_age),
            self.refresh(Dataset::BalanceSheet, max_age),
        );
        report.push(Dataset::Forex, forex);
        report.push(Dataset::CompanyProfile, profile);
        report.push(Dataset::IncomeStatement, income);
        report.push(Dataset::BalanceSheet, balance);
        report
    }

    /// Ensure every symbol in `symbols` is fresh in `dataset`.
    ///
    /// The freshness horizon `now_us` is taken once for the whole pass and
    /// stamped on every row written by it.
    pub async fn refresh_symbols(
        &self,
        dataset: Dataset,
        symbols: &[String],
        max_age: Duration,
    ) -> Result<RefreshSummary> {
        let now_us = self.clock.now_us();
        let funds = self.fund_set(dataset);

        info!(
            "Refreshing {} for {} symbols (max age {:?})",
            dataset,
            symbols.len(),
            max_age
        );

        let futures: Vec<_> = symbols
            .iter()
            .map(|symbol| {
                let funds = funds.as_deref();
                async move {
                    let result = self
                        .refresh_one(dataset, symbol, now_us, max_age, funds)
                        .await;
                    (symbol, result)
                }
            })
            .collect();

        let results = futures::future::join_all(futures).await;

        let mut summary = RefreshSummary::new(dataset, symbols.len());
        for (symbol, result) in results {
            match result {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    error!("Failed to refresh {} for {}: {}", dataset, symbol, e);
                    summary.failed += 1;
                }
            }
        }

        match dataset {
            Dataset::CompanyProfile if summary.fetched + summary.placeholders > 0 => {
                self.funds.invalidate()
            }
            Dataset::Forex if summary.fetched + summary.placeholders > 0 => {
                if let Some(converter) = &self.usd_converter {
                    converter.invalidate();
                }
            }
            _ => {}
        }

        info!("Refreshed {}", summary);
        Ok(summary)
    }

    /// Fund/ETF symbols for a fundamentals pass, `None` for other datasets.
    ///
    /// A failed lookup disables the short-circuit for this pass instead of
    /// failing it.
    fn fund_set(&self, dataset: Dataset) -> Option<Arc<HashSet<String>>> {
        if !dataset.is_fundamentals() {
            return None;
        }
        match self.funds.symbols() {
            Ok(funds) => Some(funds),
            Err(e) => {
                warn!("Could not load fund/ETF symbols, fetching all: {}", e);
                None
            }
        }
    }

    async fn refresh_one(
        &self,
        dataset: Dataset,
        symbol: &str,
        now_us: i64,
        max_age: Duration,
        funds: Option<&HashSet<String>>,
    ) -> Result<SymbolOutcome> {
        if self.store.is_fresh(dataset, symbol, now_us, max_age)? {
            debug!("{} for {} is fresh", dataset, symbol);
            return Ok(SymbolOutcome::Fresh);
        }

        if funds.is_some_and(|funds| funds.contains(symbol)) {
            debug!("{} is a fund or ETF, skipping {}", symbol, dataset);
            self.store
                .upsert(dataset, vec![Record::placeholder(dataset, symbol)], now_us)
                .await?;
            return Ok(SymbolOutcome::FundSkipped);
        }

        let outcome = self
            .retry
            .run(&self.gate, || self.source.fetch(dataset, symbol))
            .await?;

        match outcome {
            FetchOutcome::Data(records) => {
                let records: Vec<Record> = records
                    .into_iter()
                    .filter(|record| record.belongs_to(dataset))
                    .collect();
                if records.is_empty() {
                    return self.store_no_data(dataset, symbol, now_us).await;
                }
                let written = self.store.upsert(dataset, records, now_us).await?;
                Ok(SymbolOutcome::Fetched(written))
            }
            FetchOutcome::NoData => self.store_no_data(dataset, symbol, now_us).await,
        }
    }

    async fn store_no_data(
        &self,
        dataset: Dataset,
        symbol: &str,
        now_us: i64,
    ) -> Result<SymbolOutcome> {
        debug!("No {} data for {}", dataset, symbol);
        self.store
            .upsert(dataset, vec![Record::placeholder(dataset, symbol)], now_us)
            .await?;
        Ok(SymbolOutcome::NoData)
    }

    /// Replace the symbol directory: upsert every listed symbol, then sweep
    /// the rows this pass did not touch.
    ///
    /// An empty listing is treated as a bad response and leaves the
    /// directory untouched.
    pub async fn refresh_symbol_directory(&self) -> Result<RefreshSummary> {
        let now_us = self.clock.now_us();
        let listings = self
            .retry
            .run(&self.gate, || self.source.list_symbols())
            .await?;

        let mut summary = RefreshSummary::new(Dataset::Symbols, listings.len());
        if listings.is_empty() {
            warn!("Provider returned an empty symbol directory, keeping the stored one");
            return Ok(summary);
        }

        let records = listings.into_iter().map(Record::Symbol).collect();
        summary.rows_written = self.store.upsert(Dataset::Symbols, records, now_us).await?;
        summary.fetched = summary.candidates;
        summary.removed = self
            .store
            .delete_where(Dataset::Symbols, DeletePredicate::LastUpdatedBefore(now_us))
            .await?;

        info!("Refreshed {}", summary);
        Ok(summary)
    }

    /// Upsert the USD pair metadata, then refresh each pair's price.
    async fn refresh_forex(&self, max_age: Duration) -> Result<RefreshSummary> {
        let pairs = self
            .retry
            .run(&self.gate, || self.source.list_forex_pairs())
            .await?;
        if pairs.is_empty() {
            warn!("Provider returned no USD forex pairs");
        } else {
            let written = self.store.upsert_forex_pairs(pairs).await?;
            debug!("Upserted {} forex pairs", written);
        }

        let symbols = self.store.list_forex_symbols()?;
        self.refresh_symbols(Dataset::Forex, &symbols, max_age).await
    }
}
