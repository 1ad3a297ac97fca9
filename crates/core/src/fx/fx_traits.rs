use crate::errors::Result;

/// Read access to the stored USD exchange rates.
pub trait ForexRateRepositoryTrait: Send + Sync {
    /// `(from_currency, price)` for every forex row quoted in USD with a
    /// known price. `price` is the USD value of one unit of `from_currency`.
    fn load_usd_rates(&self) -> Result<Vec<(String, f64)>>;
}
