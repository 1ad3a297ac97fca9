use serde::{Deserialize, Serialize};

use super::lenient;

/// One income statement (annual or quarterly) for a symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    pub symbol: String,

    #[serde(default, deserialize_with = "lenient::fiscal_year")]
    pub fiscal_year: i32,

    /// `FY` for annual reports, `Q1`..`Q4` for quarterly ones.
    #[serde(default)]
    pub period: String,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub reported_currency: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub revenue: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub gross_profit: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub operating_income: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub net_income: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub eps: Option<f64>,
}

/// One balance sheet statement (annual or quarterly) for a symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    pub symbol: String,

    #[serde(default, deserialize_with = "lenient::fiscal_year")]
    pub fiscal_year: i32,

    #[serde(default)]
    pub period: String,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub reported_currency: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub cash_and_cash_equivalents: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_assets: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_liabilities: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_stockholders_equity: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_debt: Option<f64>,
}

impl BalanceSheet {
    /// Book value: total assets less total liabilities.
    pub fn book_value(&self) -> Option<f64> {
        match (self.total_assets, self.total_liabilities) {
            (Some(assets), Some(liabilities)) => Some(assets - liabilities),
            (Some(assets), None) => Some(assets),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fiscal_year_as_string() {
        let json = serde_json::json!({
            "date": "2024-09-28",
            "symbol": "AAPL",
            "reportedCurrency": "USD",
            "fiscalYear": "2024",
            "period": "FY",
            "revenue": 391035000000u64,
            "netIncome": 93736000000u64,
            "eps": 6.11
        });
        let income: IncomeStatement = serde_json::from_value(json).unwrap();
        assert_eq!(income.fiscal_year, 2024);
        assert_eq!(income.period, "FY");
        assert_eq!(income.net_income, Some(93_736_000_000.0));
    }

    #[test]
    fn test_book_value() {
        let sheet = BalanceSheet {
            symbol: "AAA".to_string(),
            fiscal_year: 2024,
            period: "FY".to_string(),
            total_assets: Some(500.0),
            total_liabilities: Some(320.0),
            ..Default::default()
        };
        assert_eq!(sheet.book_value(), Some(180.0));
        assert_eq!(BalanceSheet::default().book_value(), None);
    }
}
