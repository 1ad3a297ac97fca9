use super::dice_model::{AnnualFundamentals, EquityProfile};
use crate::errors::Result;

/// Point-in-time reads the sampling engine needs from the record store.
pub trait UniverseRepositoryTrait: Send + Sync {
    /// Company profiles excluding funds, ETFs and placeholder rows.
    fn load_equity_profiles(&self) -> Result<Vec<EquityProfile>>;

    /// Latest `FY` income statement and balance sheet per symbol.
    fn load_latest_annual_fundamentals(&self) -> Result<Vec<AnnualFundamentals>>;
}
