use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};

use super::fx_traits::ForexRateRepositoryTrait;
use crate::errors::{Error, Result};

pub const USD: &str = "USD";

/// Currency markers meaning "no currency reported".
const MISSING_CURRENCY_MARKERS: [&str; 3] = ["unknown", "none", "nan"];

/// Immutable `{currency -> USD price}` snapshot.
#[derive(Clone, Debug, Default)]
pub struct UsdRates {
    rates: Arc<HashMap<String, f64>>,
}

impl UsdRates {
    pub fn new(rows: impl IntoIterator<Item = (String, f64)>) -> Self {
        let mut rates: HashMap<String, f64> = rows
            .into_iter()
            .filter(|(_, price)| price.is_finite())
            .map(|(currency, price)| (currency.trim().to_uppercase(), price))
            .collect();
        rates.insert(USD.to_string(), 1.0);
        Self {
            rates: Arc::new(rates),
        }
    }

    /// USD price of one unit of `currency`, if mapped.
    pub fn rate(&self, currency: &str) -> Option<f64> {
        self.rates.get(&currency.trim().to_uppercase()).copied()
    }

    /// Convert `amount` in `currency` to USD.
    ///
    /// A missing currency (`None`, `"unknown"`, `"None"`, `"nan"`) returns
    /// `amount` unchanged. A code with no rate is a [`Error::CurrencyLookup`].
    pub fn to_usd(&self, currency: Option<&str>, amount: f64) -> Result<f64> {
        let Some(code) = currency.map(str::trim).filter(|code| !is_missing(code)) else {
            return Ok(amount);
        };
        self.rate(code)
            .map(|price| price * amount)
            .ok_or_else(|| Error::CurrencyLookup(code.to_string()))
    }
}

fn is_missing(code: &str) -> bool {
    code.is_empty()
        || MISSING_CURRENCY_MARKERS
            .iter()
            .any(|marker| code.eq_ignore_ascii_case(marker))
}

/// Lazily loaded, explicitly invalidated cache of [`UsdRates`].
///
/// The first conversion loads every USD rate from the repository. The
/// snapshot is kept until [`invalidate`](Self::invalidate) or
/// [`reload`](Self::reload) is called, typically after a forex refresh.
#[derive(Clone)]
pub struct UsdConverter {
    repository: Arc<dyn ForexRateRepositoryTrait>,
    cache: Arc<RwLock<Option<UsdRates>>>,
}

impl UsdConverter {
    pub fn new(repository: Arc<dyn ForexRateRepositoryTrait>) -> Self {
        Self {
            repository,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, Option<UsdRates>> {
        self.cache.read().unwrap_or_else(|poisoned| {
            warn!("USD rate cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, Option<UsdRates>> {
        self.cache.write().unwrap_or_else(|poisoned| {
            warn!("USD rate cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Current snapshot, loading it on first use.
    pub fn rates(&self) -> Result<UsdRates> {
        if let Some(rates) = self.read_cache().as_ref() {
            return Ok(rates.clone());
        }
        self.reload()
    }

    /// Reload the snapshot from the repository.
    pub fn reload(&self) -> Result<UsdRates> {
        let rates = UsdRates::new(self.repository.load_usd_rates()?);
        debug!("Loaded {} USD exchange rates", rates.rates.len());
        *self.write_cache() = Some(rates.clone());
        Ok(rates)
    }

    /// Drop the snapshot; the next conversion reloads it.
    pub fn invalidate(&self) {
        *self.write_cache() = None;
    }

    pub fn to_usd(&self, currency: Option<&str>, amount: f64) -> Result<f64> {
        self.rates()?.to_usd(currency, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockForexRepository {
        rows: Mutex<Vec<(String, f64)>>,
        loads: AtomicUsize,
    }

    impl MockForexRepository {
        fn new(rows: &[(&str, f64)]) -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(rows.iter().map(|(c, p)| (c.to_string(), *p)).collect()),
                loads: AtomicUsize::new(0),
            })
        }
    }

    impl ForexRateRepositoryTrait for MockForexRepository {
        fn load_usd_rates(&self) -> Result<Vec<(String, f64)>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    #[test]
    fn test_usd_is_identity() {
        let rates = UsdRates::new(Vec::new());
        for x in [0.0, 1.5, -3.0, 1e12] {
            assert_eq!(rates.to_usd(Some("USD"), x).unwrap(), x);
        }
    }

    #[test]
    fn test_mapped_currency_multiplies() {
        let rates = UsdRates::new(vec![("EUR".to_string(), 1.1)]);
        assert_eq!(rates.to_usd(Some("EUR"), 200.0).unwrap(), 1.1 * 200.0);
        assert_eq!(rates.to_usd(Some("eur"), 10.0).unwrap(), 1.1 * 10.0);
    }

    #[test]
    fn test_missing_currency_passes_through() {
        let rates = UsdRates::new(Vec::new());
        assert_eq!(rates.to_usd(None, 7.0).unwrap(), 7.0);
        assert_eq!(rates.to_usd(Some("unknown"), 7.0).unwrap(), 7.0);
        assert_eq!(rates.to_usd(Some("None"), 7.0).unwrap(), 7.0);
        assert_eq!(rates.to_usd(Some("NaN"), 7.0).unwrap(), 7.0);
    }

    #[test]
    fn test_unmapped_currency_is_lookup_error() {
        let rates = UsdRates::new(vec![("EUR".to_string(), 1.1)]);
        let err = rates.to_usd(Some("JPY"), 1.0).unwrap_err();
        assert!(matches!(err, Error::CurrencyLookup(code) if code == "JPY"));
    }

    #[test]
    fn test_converter_loads_once_until_invalidated() {
        let repository = MockForexRepository::new(&[("EUR", 1.1)]);
        let converter = UsdConverter::new(repository.clone());

        assert_eq!(converter.to_usd(Some("EUR"), 1.0).unwrap(), 1.1);
        assert_eq!(converter.to_usd(Some("EUR"), 2.0).unwrap(), 2.2);
        assert_eq!(repository.loads.load(Ordering::SeqCst), 1);

        *repository.rows.lock().unwrap() = vec![("EUR".to_string(), 1.2)];
        assert_eq!(converter.to_usd(Some("EUR"), 1.0).unwrap(), 1.1);

        converter.invalidate();
        assert_eq!(converter.to_usd(Some("EUR"), 1.0).unwrap(), 1.2);
        assert_eq!(repository.loads.load(Ordering::SeqCst), 2);
    }
}
