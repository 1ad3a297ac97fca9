//! FX module - USD conversion backed by the forex dataset.

mod fx_traits;
mod usd_converter;

pub use fx_traits::ForexRateRepositoryTrait;
pub use usd_converter::{UsdConverter, UsdRates, USD};
