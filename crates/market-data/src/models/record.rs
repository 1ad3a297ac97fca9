use super::{BalanceSheet, CompanyProfile, Dataset, ForexQuote, IncomeStatement, SymbolListing};

/// Fiscal year stored on periodic placeholder rows.
pub const PLACEHOLDER_FISCAL_YEAR: i32 = 0;

/// Period stored on periodic placeholder rows. Never matches `FY` or `Qn`.
pub const PLACEHOLDER_PERIOD: &str = "";

/// Key of a dataset row: `symbol` for point-in-time datasets,
/// `(symbol, fiscal_year, period)` for periodic ones.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub symbol: String,
    pub fiscal_year: Option<i32>,
    pub period: Option<String>,
}

impl RecordKey {
    /// Key for a placeholder row of `dataset`.
    ///
    /// Periodic placeholders use a fixed `(0, "")` fiscal key so repeated
    /// "no data" passes collapse onto a single row.
    pub fn placeholder(dataset: Dataset, symbol: &str) -> Self {
        if dataset.is_periodic() {
            Self {
                symbol: symbol.to_string(),
                fiscal_year: Some(PLACEHOLDER_FISCAL_YEAR),
                period: Some(PLACEHOLDER_PERIOD.to_string()),
            }
        } else {
            Self {
                symbol: symbol.to_string(),
                fiscal_year: None,
                period: None,
            }
        }
    }
}

/// A normalized row ready to be upserted into the record store.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Symbol(SymbolListing),
    CompanyProfile(CompanyProfile),
    IncomeStatement(IncomeStatement),
    BalanceSheet(BalanceSheet),
    ForexQuote(ForexQuote),
    /// Key fields only: "checked, nothing available".
    Placeholder(RecordKey),
}

impl Record {
    pub fn placeholder(dataset: Dataset, symbol: &str) -> Self {
        Record::Placeholder(RecordKey::placeholder(dataset, symbol))
    }

    pub fn symbol(&self) -> &str {
        match self {
            Record::Symbol(r) => &r.symbol,
            Record::CompanyProfile(r) => &r.symbol,
            Record::IncomeStatement(r) => &r.symbol,
            Record::BalanceSheet(r) => &r.symbol,
            Record::ForexQuote(r) => &r.symbol,
            Record::Placeholder(key) => &key.symbol,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Record::Placeholder(_))
    }

    /// Whether this record may be written to `dataset`.
    pub fn belongs_to(&self, dataset: Dataset) -> bool {
        match self {
            Record::Symbol(_) => dataset == Dataset::Symbols,
            Record::CompanyProfile(_) => dataset == Dataset::CompanyProfile,
            Record::IncomeStatement(_) => dataset == Dataset::IncomeStatement,
            Record::BalanceSheet(_) => dataset == Dataset::BalanceSheet,
            Record::ForexQuote(_) => dataset == Dataset::Forex,
            Record::Placeholder(key) => key.fiscal_year.is_some() == dataset.is_periodic(),
        }
    }
}

/// Terminal result of one fetch for one symbol.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    Data(Vec<Record>),
    /// The provider answered successfully but has nothing for the symbol.
    NoData,
}
