//! Vote-rate analyzer: districts accumulating votes far faster than the average.
//!
//! Only above-mean velocities are flagged; slow districts are not suspicious here.

use em_core::config::AnalysisParams;
use em_core::entities::{Anomaly, AnomalyDetail, District, Severity, Timestamp};

use crate::stats::{deviation_pct, mean};

pub fn detect_vote_rate_anomalies(
    districts: &[District],
    params: &AnalysisParams,
    at: Timestamp,
) -> Vec<Anomaly> {
    let velocities: Vec<f64> = districts.iter().map(|d| d.vote_velocity).collect();
    let expected = match mean(&velocities) {
        Some(m) if m > 0.0 => m,
        _ => return Vec::new(),
    };

    let mut out = Vec::new();
    for d in districts {
        let rate = d.vote_velocity;
        if rate <= expected {
            continue;
        }
        let Some(dev) = deviation_pct(rate, expected) else { continue };
        if dev <= params.vote_rate_threshold_pct {
            continue;
        }
        let severity = if dev > params.vote_rate_high_pct { Severity::High } else { Severity::Medium };
        out.push(Anomaly {
            district_id: d.id,
            district_name: Some(d.name.clone()),
            severity,
            message: format!(
                "{}: {rate:.0} votes/min is {dev:.0}% above the {expected:.0} votes/min average",
                d.name
            ),
            timestamp: at,
            detail: AnomalyDetail::VoteRate { vote_rate: rate, expected_rate: expected, deviation_percent: dev },
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::turnout::fixtures::{at, district};

    fn store(outlier: f64) -> Vec<District> {
        let mut ds: Vec<_> = (1..=7).map(|i| district(i, 0, 1000, 10.0)).collect();
        ds.push(district(8, 0, 1000, outlier));
        ds
    }

    #[test]
    fn medium_between_thresholds() {
        // mean 33.75, deviation ≈ 492.6%
        let out = detect_vote_rate_anomalies(&store(200.0), &AnalysisParams::default(), at());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::Medium);
        match &out[0].detail {
            AnomalyDetail::VoteRate { expected_rate, .. } => assert!((expected_rate - 33.75).abs() < 1e-9),
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn high_above_five_hundred_percent() {
        // mean 58.75, deviation ≈ 580.9%
        let out = detect_vote_rate_anomalies(&store(400.0), &AnalysisParams::default(), at());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::High);
    }

    #[test]
    fn slow_districts_are_not_flagged() {
        let mut ds: Vec<_> = (1..=7).map(|i| district(i, 0, 1000, 100.0)).collect();
        ds.push(district(8, 0, 1000, 0.0));
        assert!(detect_vote_rate_anomalies(&ds, &AnalysisParams::default(), at()).is_empty());
    }

    #[test]
    fn zero_mean_is_quiet() {
        let ds: Vec<_> = (1..=3).map(|i| district(i, 0, 1000, 0.0)).collect();
        assert!(detect_vote_rate_anomalies(&ds, &AnalysisParams::default(), at()).is_empty());
    }
}
