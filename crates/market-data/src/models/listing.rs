use serde::{Deserialize, Serialize};

use super::lenient;

/// Entry of the provider's financial-statement symbol directory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolListing {
    pub symbol: String,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub company_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub trading_currency: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub reporting_currency: Option<String>,
}
