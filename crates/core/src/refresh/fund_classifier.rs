use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use log::{debug, warn};

use crate::errors::Result;
use crate::records::RecordStore;

/// Cached "is this symbol a fund or ETF" predicate, sourced from the
/// company profile dataset.
///
/// Loaded on first use and kept until [`invalidate`](Self::invalidate) or
/// [`reload`](Self::reload). Symbols without a profile are not funds.
#[derive(Clone)]
pub struct FundClassifier {
    store: Arc<dyn RecordStore>,
    cache: Arc<RwLock<Option<Arc<HashSet<String>>>>>,
}

impl FundClassifier {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Current fund/ETF symbol set, loading it on first use.
    pub fn symbols(&self) -> Result<Arc<HashSet<String>>> {
        {
            let cache = self.cache.read().unwrap_or_else(|poisoned| {
                warn!("Fund classifier lock poisoned, recovering");
                poisoned.into_inner()
            });
            if let Some(symbols) = cache.as_ref() {
                return Ok(symbols.clone());
            }
        }
        self.reload()
    }

    pub fn reload(&self) -> Result<Arc<HashSet<String>>> {
        let symbols = Arc::new(self.store.fund_or_etf_symbols()?);
        debug!("Loaded {} fund/ETF symbols", symbols.len());
        let mut cache = self.cache.write().unwrap_or_else(|poisoned| {
            warn!("Fund classifier lock poisoned, recovering");
            poisoned.into_inner()
        });
        *cache = Some(symbols.clone());
        Ok(symbols)
    }

    pub fn invalidate(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|poisoned| {
            warn!("Fund classifier lock poisoned, recovering");
            poisoned.into_inner()
        });
        *cache = None;
    }
}
