use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// How rows of the universe are weighted for a roll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Weighting {
    /// Every eligible symbol is equally likely.
    Uniform,
    /// Probability proportional to USD market capitalization.
    #[default]
    MarketCap,
    /// Probability proportional to a geometric blend of book value,
    /// profit, revenue and market cap.
    Blended,
}

impl Weighting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weighting::Uniform => "uniform",
            Weighting::MarketCap => "market-cap",
            Weighting::Blended => "blended",
        }
    }
}

impl From<bool> for Weighting {
    /// `true` maps to market cap weighting, `false` to uniform.
    fn from(weighted: bool) -> Self {
        if weighted {
            Weighting::MarketCap
        } else {
            Weighting::Uniform
        }
    }
}

impl fmt::Display for Weighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weighting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "uniform" => Ok(Weighting::Uniform),
            "market-cap" | "mcap" | "weighted" => Ok(Weighting::MarketCap),
            "blended" => Ok(Weighting::Blended),
            _ => Err(Error::InvalidConfigValue(format!("unknown weighting '{}'", s))),
        }
    }
}

/// One sampled symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRoll {
    pub symbol: String,
    pub company_name: Option<String>,
    pub market_cap_usd: f64,
}

/// Profile fields the universe is built from. Funds and ETFs are never
/// part of it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EquityProfile {
    pub symbol: String,
    pub company_name: Option<String>,
    pub currency: Option<String>,
    pub market_cap: Option<f64>,
}

/// Latest annual (`FY`) figures of a symbol, in their reported currencies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnualFundamentals {
    pub symbol: String,
    pub income_currency: Option<String>,
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub balance_currency: Option<String>,
    pub book_value: Option<f64>,
}

/// Eligible universe row, valid for one roll only.
#[derive(Clone, Debug, PartialEq)]
pub struct UniverseRow {
    pub symbol: String,
    pub company_name: Option<String>,
    pub market_cap_usd: f64,
    pub weight: f64,
}

impl From<&UniverseRow> for DiceRoll {
    fn from(row: &UniverseRow) -> Self {
        DiceRoll {
            symbol: row.symbol.clone(),
            company_name: row.company_name.clone(),
            market_cap_usd: row.market_cap_usd,
        }
    }
}
