use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use rand::Rng;

use super::dice_model::{AnnualFundamentals, DiceRoll, UniverseRow, Weighting};
use super::dice_traits::UniverseRepositoryTrait;
use super::sampler;
use crate::errors::{Error, Result};
use crate::fx::{UsdConverter, UsdRates};

/// Rolls the dice over the refreshed universe of equities.
#[derive(Clone)]
pub struct DiceService {
    repository: Arc<dyn UniverseRepositoryTrait>,
    converter: UsdConverter,
}

impl DiceService {
    pub fn new(repository: Arc<dyn UniverseRepositoryTrait>, converter: UsdConverter) -> Self {
        Self {
            repository,
            converter,
        }
    }

    /// Draw `n` symbols, market cap weighted when `weighted`.
    pub fn roll(&self, n: i64, weighted: bool) -> Result<Vec<DiceRoll>> {
        self.roll_with(n, Weighting::from(weighted), &mut rand::thread_rng())
    }

    /// Draw `n` symbols with replacement, in draw order.
    ///
    /// `n <= 0` yields an empty result, even when the universe is empty.
    pub fn roll_with<R: Rng + ?Sized>(
        &self,
        n: i64,
        weighting: Weighting,
        rng: &mut R,
    ) -> Result<Vec<DiceRoll>> {
        let Ok(n) = usize::try_from(n) else {
            return Ok(Vec::new());
        };
        if n == 0 {
            return Ok(Vec::new());
        }

        let universe = self.universe(weighting)?;
        if universe.is_empty() {
            return Err(Error::EmptyUniverse);
        }

        let indices = match weighting {
            Weighting::Uniform => sampler::draw_uniform(universe.len(), n, rng),
            Weighting::MarketCap | Weighting::Blended => {
                let weights: Vec<f64> = universe.iter().map(|row| row.weight).collect();
                sampler::draw_weighted(&weights, n, rng)
            }
        };

        debug!(
            "Rolled {} of {} symbols ({})",
            indices.len(),
            universe.len(),
            weighting
        );
        Ok(indices
            .into_iter()
            .map(|i| DiceRoll::from(&universe[i]))
            .collect())
    }

    /// Eligible rows ordered by symbol, with their weights.
    ///
    /// Rows with a missing, non-positive or non-finite USD market cap are dropped.
    /// One forex snapshot is used for the whole universe.
    pub fn universe(&self, weighting: Weighting) -> Result<Vec<UniverseRow>> {
        let rates = self.converter.rates()?;
        let mut profiles = self.repository.load_equity_profiles()?;
        profiles.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        let mut rows = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let Some(market_cap) = profile.market_cap.filter(|cap| *cap > 0.0) else {
                continue;
            };
            let market_cap_usd = rates.to_usd(profile.currency.as_deref(), market_cap)?;
            if !market_cap_usd.is_finite() || market_cap_usd <= 0.0 {
                continue;
            }
            rows.push(UniverseRow {
                symbol: profile.symbol,
                company_name: profile.company_name,
                market_cap_usd,
                weight: market_cap_usd,
            });
        }

        match weighting {
            Weighting::Uniform => rows.iter_mut().for_each(|row| row.weight = 1.0),
            Weighting::MarketCap => {}
            Weighting::Blended => self.apply_blended_weights(&mut rows, &rates)?,
        }

        Ok(rows)
    }

    fn apply_blended_weights(&self, rows: &mut [UniverseRow], rates: &UsdRates) -> Result<()> {
        let fundamentals: HashMap<String, AnnualFundamentals> = self
            .repository
            .load_latest_annual_fundamentals()?
            .into_iter()
            .map(|f| (f.symbol.clone(), f))
            .collect();

        for row in rows.iter_mut() {
            let (book, profit, revenue) = match fundamentals.get(&row.symbol) {
                Some(f) => (
                    usd_or_zero(rates, f.balance_currency.as_deref(), f.book_value)?,
                    usd_or_zero(rates, f.income_currency.as_deref(), f.net_income)?,
                    usd_or_zero(rates, f.income_currency.as_deref(), f.revenue)?,
                ),
                None => (0.0, 0.0, 0.0),
            };
            row.weight = sampler::blended_weight(book, profit, revenue, row.market_cap_usd);
        }
        Ok(())
    }
}

fn usd_or_zero(rates: &UsdRates, currency: Option<&str>, amount: Option<f64>) -> Result<f64> {
    match amount {
        Some(amount) if amount.is_finite() => rates.to_usd(currency, amount),
        _ => Ok(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::EquityProfile;
    use crate::fx::ForexRateRepositoryTrait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct MockUniverse {
        profiles: Vec<EquityProfile>,
        fundamentals: Vec<AnnualFundamentals>,
    }

    impl UniverseRepositoryTrait for MockUniverse {
        fn load_equity_profiles(&self) -> Result<Vec<EquityProfile>> {
            Ok(self.profiles.clone())
        }

        fn load_latest_annual_fundamentals(&self) -> Result<Vec<AnnualFundamentals>> {
            Ok(self.fundamentals.clone())
        }
    }

    struct MockForex(Vec<(String, f64)>);

    impl ForexRateRepositoryTrait for MockForex {
        fn load_usd_rates(&self) -> Result<Vec<(String, f64)>> {
            Ok(self.0.clone())
        }
    }

    fn equity(symbol: &str, market_cap: f64, currency: Option<&str>) -> EquityProfile {
        EquityProfile {
            symbol: symbol.to_string(),
            company_name: Some(format!("{} Inc.", symbol)),
            currency: currency.map(str::to_string),
            market_cap: Some(market_cap),
        }
    }

    fn service(profiles: Vec<EquityProfile>, fundamentals: Vec<AnnualFundamentals>) -> DiceService {
        let converter = UsdConverter::new(Arc::new(MockForex(vec![("EUR".to_string(), 1.1)])));
        DiceService::new(
            Arc::new(MockUniverse {
                profiles,
                fundamentals,
            }),
            converter,
        )
    }

    fn scenario() -> DiceService {
        service(
            vec![
                equity("BBB", 200.0, Some("EUR")),
                equity("AAA", 100.0, Some("USD")),
            ],
            Vec::new(),
        )
    }

    fn share_of(rolls: &[DiceRoll], symbol: &str) -> f64 {
        rolls.iter().filter(|r| r.symbol == symbol).count() as f64 / rolls.len() as f64
    }

    #[test]
    fn test_universe_converts_market_caps_to_usd() {
        let universe = scenario().universe(Weighting::MarketCap).unwrap();
        let weights: Vec<(&str, f64)> = universe
            .iter()
            .map(|row| (row.symbol.as_str(), row.weight))
            .collect();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights[0], ("AAA", 100.0));
        assert_eq!(weights[1].0, "BBB");
        assert!((weights[1].1 - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_roll_is_even() {
        let mut rng = StdRng::seed_from_u64(42);
        let rolls = scenario()
            .roll_with(1000, Weighting::Uniform, &mut rng)
            .unwrap();
        assert_eq!(rolls.len(), 1000);
        assert!((share_of(&rolls, "AAA") - 0.5).abs() < 0.06);
    }

    #[test]
    fn test_weighted_roll_follows_market_cap() {
        let mut rng = StdRng::seed_from_u64(42);
        let rolls = scenario()
            .roll_with(10_000, Weighting::MarketCap, &mut rng)
            .unwrap();
        assert_eq!(rolls.len(), 10_000);
        assert!((share_of(&rolls, "AAA") - 100.0 / 320.0).abs() < 0.02);
        let bbb = rolls.iter().find(|r| r.symbol == "BBB").unwrap();
        assert!((bbb.market_cap_usd - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_draws_is_empty_not_an_error() {
        let empty = service(Vec::new(), Vec::new());
        assert!(empty.roll(0, true).unwrap().is_empty());
        assert!(empty.roll(-3, false).unwrap().is_empty());
    }

    #[test]
    fn test_empty_universe_is_an_error() {
        let empty = service(vec![equity("ZERO", 0.0, Some("USD"))], Vec::new());
        assert!(matches!(empty.roll(1, true), Err(Error::EmptyUniverse)));
    }

    #[test]
    fn test_unmapped_currency_fails_the_roll() {
        let dice = service(
            vec![equity("AAA", 100.0, Some("USD")), equity("JJJ", 5.0, Some("JPY"))],
            Vec::new(),
        );
        assert!(matches!(dice.roll(1, true), Err(Error::CurrencyLookup(code)) if code == "JPY"));
    }

    #[test]
    fn test_overflowing_usd_market_cap_is_dropped() {
        let dice = service(
            vec![
                equity("AAA", 100.0, Some("USD")),
                equity("BIG", f64::MAX, Some("EUR")),
                equity("INF", f64::INFINITY, Some("USD")),
            ],
            Vec::new(),
        );
        let universe = dice.universe(Weighting::MarketCap).unwrap();
        let symbols: Vec<&str> = universe.iter().map(|row| row.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAA"]);

        let mut rng = StdRng::seed_from_u64(7);
        let rolls = dice.roll_with(50, Weighting::MarketCap, &mut rng).unwrap();
        assert!(rolls.iter().all(|r| r.symbol == "AAA"));
    }

    #[test]
    fn test_missing_currency_is_taken_as_usd() {
        let dice = service(vec![equity("AAA", 100.0, None)], Vec::new());
        let universe = dice.universe(Weighting::MarketCap).unwrap();
        assert_eq!(universe[0].market_cap_usd, 100.0);
    }

    #[test]
    fn test_blended_weights_use_fundamentals() {
        let dice = service(
            vec![equity("AAA", 10_000.0, Some("USD")), equity("BBB", 10_000.0, Some("USD"))],
            vec![AnnualFundamentals {
                symbol: "AAA".to_string(),
                income_currency: Some("EUR".to_string()),
                revenue: Some(1_000.0),
                net_income: Some(100.0),
                balance_currency: Some("USD".to_string()),
                book_value: Some(500.0),
            }],
        );

        let universe = dice.universe(Weighting::Blended).unwrap();
        let expected = sampler::blended_weight(500.0, 110.0, 1_100.0, 10_000.0);
        assert!((universe[0].weight - expected).abs() < 1e-9);
        assert!((universe[1].weight - 100.0).abs() < 1e-9);
        assert!(universe[0].weight > universe[1].weight);
    }
}
