// crates/em_algo/src/simulation/increment.rs
//
// Per-tick vote increments: ordinary noise around the base rate, or an injected
// out-of-distribution increment. Both paths go through `varied_increment`.

use em_core::config::{AnomalyKind, SimulationParams};
use em_core::rng::RandomSource;

/// Outcome of the increment draw for one district.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IncrementDraw {
    /// Raw increment before the per-candidate split.
    pub raw: u64,
    /// Set when the increment was anomaly-injected.
    pub injected: Option<AnomalyKind>,
}

/// `round(base * (1 + U(-variance/2, variance/2)))`, floored at 1. Consumes one draw.
pub fn varied_increment<R: RandomSource + ?Sized>(base: f64, variance: f64, rng: &mut R) -> u64 {
    let half = variance / 2.0;
    let factor = 1.0 + rng.uniform(-half, half);
    let v = (base * factor).round();
    if v.is_finite() && v >= 1.0 {
        // Saturating float → int cast keeps absurd bases from wrapping.
        v as u64
    } else {
        1
    }
}

/// Draw this tick's increment for a district with the given base rate.
///
/// With `forced = Some(kind)` the Bernoulli trial is skipped and `kind` is injected.
/// Otherwise: one Bernoulli draw at `anomaly_rate`, then (only if it fires) one draw
/// picking among `injected_kinds`, then the variance draw.
pub fn draw_increment<R: RandomSource + ?Sized>(
    base_vote_rate: u64,
    params: &SimulationParams,
    forced: Option<AnomalyKind>,
    rng: &mut R,
) -> IncrementDraw {
    let injected = match forced {
        Some(kind) => Some(kind),
        None => {
            if rng.chance(params.anomaly_rate) {
                rng.index(params.injected_kinds.len())
                    .map(|i| params.injected_kinds[i])
            } else {
                None
            }
        }
    };

    let multiplier = injected.map(AnomalyKind::multiplier).unwrap_or(1.0);
    let raw = varied_increment(base_vote_rate as f64 * multiplier, params.vote_variance, rng);
    IncrementDraw { raw, injected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use em_core::rng::{SequenceRng, SimRng};

    #[test]
    fn noise_band_is_respected() {
        let mut rng = SimRng::from_seed_u64(11);
        for _ in 0..500 {
            let v = varied_increment(100.0, 0.3, &mut rng);
            assert!((85..=115).contains(&v), "{v}");
        }
    }

    #[test]
    fn increment_is_floored_at_one() {
        let mut rng = SequenceRng::constant(0.0);
        assert_eq!(varied_increment(0.2, 0.3, &mut rng), 1);
    }

    #[test]
    fn normal_draw_when_bernoulli_misses() {
        // 0.9 misses the 5% trial, then the variance draw lands at the midpoint.
        let mut rng = SequenceRng::from_units(&[0.9, 0.5]);
        let d = draw_increment(100, &SimulationParams::default(), None, &mut rng);
        assert_eq!(d, IncrementDraw { raw: 100, injected: None });
    }

    #[test]
    fn bernoulli_hit_picks_kind_and_scales() {
        // hit, kind index 1 of [high_turnout, suspicious_rate], variance midpoint
        let mut rng = SequenceRng::from_units(&[0.0, 0.75, 0.5]);
        let d = draw_increment(100, &SimulationParams::default(), None, &mut rng);
        assert_eq!(d.injected, Some(AnomalyKind::SuspiciousRate));
        assert_eq!(d.raw, 800);
    }

    #[test]
    fn forced_kind_skips_bernoulli() {
        let mut params = SimulationParams::default();
        params.anomaly_rate = 0.0;
        let mut rng = SequenceRng::constant(0.5);
        let d = draw_increment(40, &params, Some(AnomalyKind::HighTurnout), &mut rng);
        assert_eq!(d, IncrementDraw { raw: 200, injected: Some(AnomalyKind::HighTurnout) });
    }

    #[test]
    fn zero_rate_never_injects() {
        let mut params = SimulationParams::default();
        params.anomaly_rate = 0.0;
        let mut rng = SequenceRng::constant(0.0);
        for _ in 0..10 {
            assert!(draw_increment(50, &params, None, &mut rng).injected.is_none());
        }
    }
}
