use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use stockdice_market_data::Dataset;

use crate::errors::Error;

/// What happened to one symbol during a refresh pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolOutcome {
    /// Already fresh, nothing fetched.
    Fresh,
    /// Fetched and stored this many rows.
    Fetched(usize),
    /// The provider had no data; a placeholder was stored.
    NoData,
    /// Fund or ETF, fundamentals skipped with a placeholder.
    FundSkipped,
}

/// Counters of one dataset refresh pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub dataset: String,
    pub candidates: usize,
    pub fresh: usize,
    pub fetched: usize,
    pub rows_written: usize,
    pub placeholders: usize,
    pub fund_skipped: usize,
    pub failed: usize,
    /// Rows removed by the symbol directory sweep.
    pub removed: usize,
}

impl RefreshSummary {
    pub fn new(dataset: Dataset, candidates: usize) -> Self {
        Self {
            dataset: dataset.to_string(),
            candidates,
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &SymbolOutcome) {
        match outcome {
            SymbolOutcome::Fresh => self.fresh += 1,
            SymbolOutcome::Fetched(rows) => {
                self.fetched += 1;
                self.rows_written += rows;
            }
            SymbolOutcome::NoData => self.placeholders += 1,
            SymbolOutcome::FundSkipped => self.fund_skipped += 1,
        }
    }
}

impl fmt::Display for RefreshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} candidates, {} fresh, {} fetched ({} rows), {} no data, {} funds skipped, {} failed",
            self.dataset,
            self.candidates,
            self.fresh,
            self.fetched,
            self.rows_written,
            self.placeholders,
            self.fund_skipped,
            self.failed
        )?;
        if self.removed > 0 {
            write!(f, ", {} removed", self.removed)?;
        }
        Ok(())
    }
}

/// Outcome of a multi-dataset refresh. A failed dataset does not stop the
/// others.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub summaries: Vec<RefreshSummary>,
    pub failures: Vec<(Dataset, Error)>,
}

impl RefreshReport {
    pub fn push(&mut self, dataset: Dataset, result: crate::errors::Result<RefreshSummary>) {
        match result {
            Ok(summary) => self.summaries.push(summary),
            Err(err) => {
                log::error!("Refresh of {} failed: {}", dataset, err);
                self.failures.push((dataset, err));
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Which datasets a refresh covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshScope {
    /// Symbol directory, then forex and company profiles.
    MarketData,
    /// Symbol directory, then every other dataset.
    Everything,
    Dataset(Dataset),
}

impl FromStr for RefreshScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "market" | "market-data" => Ok(RefreshScope::MarketData),
            "all" | "everything" => Ok(RefreshScope::Everything),
            other => other
                .parse::<Dataset>()
                .map(RefreshScope::Dataset)
                .map_err(|_| Error::InvalidConfigValue(format!("unknown refresh scope '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parsing() {
        assert_eq!("market".parse::<RefreshScope>().unwrap(), RefreshScope::MarketData);
        assert_eq!("ALL".parse::<RefreshScope>().unwrap(), RefreshScope::Everything);
        assert_eq!(
            "balance-sheet".parse::<RefreshScope>().unwrap(),
            RefreshScope::Dataset(Dataset::BalanceSheet)
        );
        assert!("bonds".parse::<RefreshScope>().is_err());
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let mut summary = RefreshSummary::new(Dataset::IncomeStatement, 4);
        summary.record(&SymbolOutcome::Fresh);
        summary.record(&SymbolOutcome::Fetched(5));
        summary.record(&SymbolOutcome::NoData);
        summary.record(&SymbolOutcome::FundSkipped);

        assert_eq!(summary.fresh, 1);
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.rows_written, 5);
        assert_eq!(summary.placeholders, 1);
        assert_eq!(summary.fund_skipped, 1);
        assert!(summary.to_string().starts_with("income_statement: 4 candidates"));
    }
}
