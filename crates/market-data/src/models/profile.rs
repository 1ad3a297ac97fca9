use serde::{Deserialize, Serialize};

use super::lenient;

/// Company profile as published by the provider's `profile` endpoint.
///
/// Only the fields the sampler and fund classifier need, plus a handful of
/// descriptive ones, are kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub symbol: String,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub company_name: Option<String>,

    /// Trading currency of `price` and `market_cap` (ISO 4217).
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub currency: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub market_cap: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub beta: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub exchange: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub industry: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub sector: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub country: Option<String>,

    #[serde(default)]
    pub is_etf: Option<bool>,

    #[serde(default)]
    pub is_fund: Option<bool>,

    #[serde(default)]
    pub is_actively_trading: Option<bool>,

    #[serde(default)]
    pub is_adr: Option<bool>,
}

impl CompanyProfile {
    /// Whether the profile describes a fund or an ETF.
    pub fn is_fund_or_etf(&self) -> bool {
        self.is_etf.unwrap_or(false) || self.is_fund.unwrap_or(false)
    }
}
