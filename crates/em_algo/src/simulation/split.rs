// crates/em_algo/src/simulation/split.rs
//
// Randomized proportional split of one increment across the current candidates.
//
// Contract:
// - Works for any candidate count ≥ 1 (the count may change between ticks).
// - Fractions are normalized so they sum to 1.0 up to float rounding.
// - Rounded shares are NOT corrected back to the raw increment; the drift of at most
//   ±(n/2) votes is accepted slack.

use em_core::rng::RandomSource;

/// Draw `n` fractions summing to 1. Consumes `n - 1` draws.
///
/// Each candidate but the last takes `U(0, max_share)` of what remains; the last takes
/// the remainder; all fractions are then divided by their sum.
pub fn random_split<R: RandomSource + ?Sized>(n: usize, max_share: f64, rng: &mut R) -> Vec<f64> {
    match n {
        0 => return Vec::new(),
        1 => return vec![1.0],
        _ => {}
    }

    let mut fractions = Vec::with_capacity(n);
    let mut remaining = 1.0f64;
    for _ in 0..n - 1 {
        let f = rng.unit() * max_share * remaining;
        fractions.push(f);
        remaining -= f;
    }
    fractions.push(remaining);

    let total: f64 = fractions.iter().sum();
    if total > 0.0 && total.is_finite() {
        for f in fractions.iter_mut() {
            *f /= total;
        }
    }
    fractions
}

/// `round(raw * fraction)` per candidate, in the same order as `fractions`.
pub fn apportion(raw: u64, fractions: &[f64]) -> Vec<u64> {
    fractions
        .iter()
        .map(|f| {
            let share = (raw as f64 * f).round();
            if share.is_finite() && share > 0.0 { share as u64 } else { 0 }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use em_core::rng::{SequenceRng, SimRng};
    use proptest::prelude::*;

    #[test]
    fn single_candidate_takes_everything() {
        let mut rng = SequenceRng::constant(0.3);
        assert_eq!(random_split(1, 0.7, &mut rng), vec![1.0]);
        assert!(random_split(0, 0.7, &mut rng).is_empty());
    }

    #[test]
    fn scripted_split_is_exact() {
        // c1: 0.5 * 0.7 * 1.0 = 0.35; c2: 0.5 * 0.7 * 0.65 = 0.2275; c3: the rest
        let mut rng = SequenceRng::constant(0.5);
        let f = random_split(3, 0.7, &mut rng);
        assert!((f[0] - 0.35).abs() < 1e-12);
        assert!((f[1] - 0.2275).abs() < 1e-12);
        assert!((f[2] - 0.4225).abs() < 1e-12);
    }

    #[test]
    fn rounding_drift_is_left_alone() {
        // three equal thirds of 100 round to 33 each
        let shares = apportion(100, &[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]);
        assert_eq!(shares, vec![33, 33, 33]);
    }

    proptest! {
        #[test]
        fn fractions_sum_to_one(seed in any::<u64>(), n in 1usize..12) {
            let mut rng = SimRng::from_seed_u64(seed);
            let f = random_split(n, 0.7, &mut rng);
            prop_assert_eq!(f.len(), n);
            prop_assert!(f.iter().all(|x| *x >= 0.0));
            prop_assert!((f.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }

        #[test]
        fn apportion_drift_is_bounded(seed in any::<u64>(), n in 1usize..12, raw in 1u64..10_000) {
            let mut rng = SimRng::from_seed_u64(seed);
            let shares = apportion(raw, &random_split(n, 0.7, &mut rng));
            let sum: u64 = shares.iter().sum();
            let drift = (sum as i64 - raw as i64).unsigned_abs();
            prop_assert!(drift <= n as u64);
        }
    }
}
