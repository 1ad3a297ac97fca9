use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One financial fact table kept fresh by the refresh engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    /// Directory of symbols that report financial statements.
    Symbols,
    CompanyProfile,
    IncomeStatement,
    BalanceSheet,
    /// Currency pairs quoted against USD.
    Forex,
}

impl Dataset {
    pub const ALL: [Dataset; 5] = [
        Dataset::Symbols,
        Dataset::CompanyProfile,
        Dataset::IncomeStatement,
        Dataset::BalanceSheet,
        Dataset::Forex,
    ];

    /// Stable identifier, also used as the SQLite table name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Symbols => "symbol_list",
            Dataset::CompanyProfile => "company_profile",
            Dataset::IncomeStatement => "income_statement",
            Dataset::BalanceSheet => "balance_sheet",
            Dataset::Forex => "forex",
        }
    }

    /// Periodic datasets are keyed by `(symbol, fiscal_year, period)`.
    pub fn is_periodic(&self) -> bool {
        matches!(self, Dataset::IncomeStatement | Dataset::BalanceSheet)
    }

    /// Fundamentals are meaningless for funds and ETFs, so the refresh
    /// engine may short-circuit them.
    pub fn is_fundamentals(&self) -> bool {
        self.is_periodic()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "symbols" | "symbol_list" => Ok(Dataset::Symbols),
            "company_profile" | "profile" => Ok(Dataset::CompanyProfile),
            "income_statement" | "income" => Ok(Dataset::IncomeStatement),
            "balance_sheet" => Ok(Dataset::BalanceSheet),
            "forex" => Ok(Dataset::Forex),
            other => Err(format!("unknown dataset '{}'", other)),
        }
    }
}
