//! Moving-average analyzer over each district's increment series.
//!
//! Only the latest point is evaluated. Points without a moving average (the first
//! `window - 1`) and points whose moving average is zero are never flagged.

use em_core::config::AnalysisParams;
use em_core::entities::{Anomaly, AnomalyDetail, District, Severity, Timestamp, VoteHistoryEntry};

use super::series::increment_series;
use crate::stats::{deviation_pct, moving_average};

pub fn detect_moving_average_anomalies(
    districts: &[District],
    history: &[VoteHistoryEntry],
    params: &AnalysisParams,
    at: Timestamp,
) -> Vec<Anomaly> {
    let series = increment_series(history);
    let mut out = Vec::new();

    for d in districts {
        let Some(values) = series.get(&d.id) else { continue };
        let Some(&latest) = values.last() else { continue };
        let Some(Some(avg)) = moving_average(values, params.moving_average_window).last().copied() else {
            continue;
        };
        let Some(dev) = deviation_pct(latest, avg) else { continue };

        let severity = if dev > params.moving_average_high_pct {
            Severity::High
        } else if dev > params.moving_average_threshold_pct {
            Severity::Medium
        } else {
            continue;
        };

        out.push(Anomaly {
            district_id: d.id,
            district_name: Some(d.name.clone()),
            severity,
            message: format!(
                "{}: increment of {latest:.0} deviates {dev:.0}% from the {}-tick average of {avg:.1}",
                d.name, params.moving_average_window
            ),
            timestamp: at,
            detail: AnomalyDetail::MovingAverage { moving_average_value: avg, deviation_percent: dev },
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::series::fixtures::history;
    use crate::analysis::turnout::fixtures::{at, district};

    fn run(last_total: u64) -> Vec<Anomaly> {
        let h = history(&[vec![0], vec![100], vec![200], vec![300], vec![400], vec![last_total]]);
        detect_moving_average_anomalies(&[district(1, last_total, 50_000, 0.0)], &h, &AnalysisParams::default(), at())
    }

    #[test]
    fn eightfold_spike_is_high() {
        // increments [100 ×4, 800], average 240 → deviation ≈ 233%
        let out = run(1200);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::High);
    }

    #[test]
    fn fivefold_spike_is_medium() {
        // increments [100 ×4, 500], average 180 → deviation ≈ 178%
        let out = run(900);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, Severity::Medium);
    }

    #[test]
    fn steady_increments_are_quiet() {
        assert!(run(500).is_empty());
    }

    #[test]
    fn short_series_is_never_flagged() {
        let h = history(&[vec![0], vec![10], vec![20], vec![5000]]);
        let out = detect_moving_average_anomalies(&[district(1, 5000, 50_000, 0.0)], &h, &AnalysisParams::default(), at());
        assert!(out.is_empty());
    }
}
