//! crates/em_algo/src/stats.rs
//! Population statistics used by the analyzers.
//!
//! Degenerate inputs never produce NaN/∞: an empty population has no mean, and a
//! zero-variance population scores every member at z = 0.

const FLAT_TOLERANCE: f64 = 1e-12;

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    m.is_finite().then_some(m)
}

/// Population (not sample) standard deviation; `None` for an empty slice.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    let sd = var.sqrt();
    sd.is_finite().then_some(sd)
}

/// Mean and standard deviation when the population actually spreads out.
///
/// A deviation within float noise of the mean's magnitude counts as zero variance.
fn spread(population: &[f64]) -> Option<(f64, f64)> {
    let m = mean(population)?;
    let sd = population_std_dev(population)?;
    if sd <= FLAT_TOLERANCE * m.abs().max(1.0) {
        return None;
    }
    Some((m, sd))
}

/// `(x - mean) / stddev` over `population`; 0 when the population is empty or flat.
pub fn z_score(x: f64, population: &[f64]) -> f64 {
    match spread(population) {
        Some((m, sd)) => finite_or_zero((x - m) / sd),
        None => 0.0,
    }
}

/// z-score of every member against the whole slice.
pub fn z_scores(values: &[f64]) -> Vec<f64> {
    match spread(values) {
        Some((m, sd)) => values.iter().map(|v| finite_or_zero((v - m) / sd)).collect(),
        None => vec![0.0; values.len()],
    }
}

#[inline]
fn finite_or_zero(z: f64) -> f64 {
    if z.is_finite() { z } else { 0.0 }
}

/// Trailing moving average. Index `i` averages `values[i + 1 - window ..= i]`;
/// the first `window - 1` points have no value. A zero window yields all `None`.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut running = 0.0;
    for (i, v) in values.iter().enumerate() {
        running += v;
        if i >= window {
            running -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(running / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// `|value - reference| / reference * 100`; `None` when the reference is not positive.
pub fn deviation_pct(value: f64, reference: f64) -> Option<f64> {
    if !(reference.is_finite() && reference > 0.0) {
        return None;
    }
    let d = (value - reference).abs() / reference * 100.0;
    d.is_finite().then_some(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn flat_population_scores_zero() {
        assert_eq!(z_score(5.0, &[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(z_scores(&[2.0, 2.0]), vec![0.0, 0.0]);
        assert_eq!(z_score(1.0, &[]), 0.0);
    }

    #[test]
    fn population_not_sample_std_dev() {
        // mean 5, squared deviations sum 32, n = 8 → variance 4
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std_dev(&xs).unwrap() - 2.0).abs() < 1e-12);
        assert!((z_score(9.0, &xs) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn moving_average_prefix_is_absent() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 5);
        assert_eq!(&ma[..4], &[None, None, None, None]);
        assert_eq!(ma[4], Some(3.0));
        assert_eq!(ma[5], Some(4.0));
    }

    #[test]
    fn deviation_needs_positive_reference() {
        assert_eq!(deviation_pct(3.0, 0.0), None);
        assert_eq!(deviation_pct(300.0, 100.0), Some(200.0));
    }

    proptest! {
        #[test]
        fn mean_of_population_scores_zero(xs in prop::collection::vec(-1.0e6f64..1.0e6, 1..40)) {
            let m = mean(&xs).unwrap();
            prop_assert!(z_score(m, &xs).abs() < 1e-6);
        }

        #[test]
        fn moving_average_undefined_before_window(
            xs in prop::collection::vec(0.0f64..1.0e4, 0..30),
            window in 1usize..8,
        ) {
            let ma = moving_average(&xs, window);
            prop_assert_eq!(ma.len(), xs.len());
            for (i, v) in ma.iter().enumerate() {
                prop_assert_eq!(v.is_some(), i + 1 >= window);
            }
        }

        #[test]
        fn constant_population_is_never_an_outlier(c in -1.0e6f64..1.0e6, n in 1usize..20) {
            let xs = vec![c; n];
            prop_assert!(z_scores(&xs).iter().all(|z| *z == 0.0));
        }
    }
}
