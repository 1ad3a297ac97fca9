//! Index draws over a fixed universe of `k` rows.
//!
//! Weighted draws use inverse-CDF sampling: with `cdf_i = sum(p_j, j <= i)`
//! and `u` uniform in `[0, 1)`, the drawn index is the smallest `i` with
//! `cdf_i >= u`.

use rand::Rng;

/// Draw `n` indices uniformly from `0..k`, with replacement.
pub fn draw_uniform<R: Rng + ?Sized>(k: usize, n: usize, rng: &mut R) -> Vec<usize> {
    if k == 0 {
        return Vec::new();
    }
    (0..n).map(|_| rng.gen_range(0..k)).collect()
}

/// Normalized cumulative distribution of `weights`.
///
/// Weights must be positive and finite; the last entry is 1 up to rounding.
pub fn cumulative_distribution(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    let mut running = 0.0;
    weights
        .iter()
        .map(|w| {
            running += w / total;
            running
        })
        .collect()
}

/// Smallest index whose cumulative probability is `>= u`.
///
/// Clamped to the last index so rounding in the final cdf entry can never
/// push a draw out of range.
pub fn select_index(cdf: &[f64], u: f64) -> usize {
    cdf.partition_point(|c| *c < u)
        .min(cdf.len().saturating_sub(1))
}

/// Draw `n` indices with probability proportional to `weights`, with
/// replacement.
pub fn draw_weighted<R: Rng + ?Sized>(weights: &[f64], n: usize, rng: &mut R) -> Vec<usize> {
    if weights.is_empty() {
        return Vec::new();
    }
    let cdf = cumulative_distribution(weights);
    (0..n)
        .map(|_| select_index(&cdf, rng.gen::<f64>()))
        .collect()
}

/// Blended weight of a company: a weighted geometric mean of book value,
/// profit, revenue and market cap (weights 1, 2, 2 and 5), each floored at 1.
pub fn blended_weight(book: f64, profit: f64, revenue: f64, market_cap: f64) -> f64 {
    let ln_floor = |x: f64| if x.is_nan() { 0.0 } else { x.max(1.0).ln() };
    ((ln_floor(book) + 2.0 * ln_floor(profit) + 2.0 * ln_floor(revenue)
        + 5.0 * ln_floor(market_cap))
        / 10.0)
        .exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_select_index_ties_pick_smallest() {
        let cdf = [0.25, 0.25, 1.0];
        assert_eq!(select_index(&cdf, 0.0), 0);
        assert_eq!(select_index(&cdf, 0.25), 0);
        assert_eq!(select_index(&cdf, 0.2500001), 2);
        assert_eq!(select_index(&cdf, 0.999), 2);
    }

    #[test]
    fn test_select_index_clamps_rounding() {
        let cdf = [0.5, 0.9999999];
        assert_eq!(select_index(&cdf, 0.99999995), 1);
    }

    #[test]
    fn test_weighted_frequency_converges() {
        let mut rng = StdRng::seed_from_u64(7);
        let draws = draw_weighted(&[1.0, 3.0], 100_000, &mut rng);
        let b = draws.iter().filter(|i| **i == 1).count() as f64 / draws.len() as f64;
        assert!((b - 0.75).abs() < 0.01, "frequency of B was {}", b);
    }

    #[test]
    fn test_uniform_covers_universe() {
        let mut rng = StdRng::seed_from_u64(1);
        let draws = draw_uniform(4, 1_000, &mut rng);
        assert_eq!(draws.len(), 1_000);
        for i in 0..4 {
            assert!(draws.contains(&i));
        }
    }

    #[test]
    fn test_empty_universe_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(draw_uniform(0, 5, &mut rng).is_empty());
        assert!(draw_weighted(&[], 5, &mut rng).is_empty());
    }

    #[test]
    fn test_blended_weight_reduces_to_market_cap() {
        // Only market cap above the floor: weight = mcap^(1/2)
        let weight = blended_weight(0.0, -5.0, f64::NAN, 10_000.0);
        assert!((weight - 100.0).abs() < 1e-9);
        // Equal inputs give the input back
        assert!((blended_weight(50.0, 50.0, 50.0, 50.0) - 50.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn test_select_index_is_smallest_satisfying(
            weights in prop::collection::vec(0.001f64..1000.0, 1..20),
            u in 0.0f64..1.0,
        ) {
            let cdf = cumulative_distribution(&weights);
            let i = select_index(&cdf, u);
            prop_assert!(i < weights.len());
            prop_assert!(cdf[i] >= u || i == cdf.len() - 1);
            prop_assert!(cdf[..i].iter().all(|c| *c < u));
        }

        #[test]
        fn test_draws_have_requested_length(
            weights in prop::collection::vec(0.001f64..1000.0, 1..10),
            n in 0usize..200,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let draws = draw_weighted(&weights, n, &mut rng);
            prop_assert_eq!(draws.len(), n);
            prop_assert!(draws.iter().all(|i| *i < weights.len()));
            prop_assert_eq!(draw_uniform(weights.len(), n, &mut rng).len(), n);
        }
    }
}
