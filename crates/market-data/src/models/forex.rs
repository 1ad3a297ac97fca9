use serde::{Deserialize, Serialize};

use super::lenient;

/// A currency pair listed by the provider's `forex-list` endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForexPair {
    /// Provider symbol for the pair, e.g. `EURUSD`.
    pub symbol: String,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub from_currency: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub to_currency: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub from_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub to_name: Option<String>,
}

impl ForexPair {
    /// Whether the pair quotes the price of one unit of `from_currency` in USD.
    pub fn quotes_usd(&self) -> bool {
        self.to_currency
            .as_deref()
            .is_some_and(|to| to.eq_ignore_ascii_case("USD"))
    }
}

/// Latest price for a forex pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForexQuote {
    pub symbol: String,
    /// USD per unit of the pair's `from_currency`. `None` when the provider
    /// answered without a price.
    pub price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_usd_is_case_insensitive() {
        let pair = ForexPair {
            symbol: "EURUSD".to_string(),
            from_currency: Some("EUR".to_string()),
            to_currency: Some("usd".to_string()),
            ..Default::default()
        };
        assert!(pair.quotes_usd());

        let other = ForexPair {
            symbol: "EURJPY".to_string(),
            to_currency: Some("JPY".to_string()),
            ..Default::default()
        };
        assert!(!other.quotes_usd());
        assert!(!ForexPair::default().quotes_usd());
    }
}
